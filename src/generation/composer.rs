//! Section composers: the pluggable writer behind each description section.
//!
//! `TemplateComposer` expands the plan's key points into fixed Russian prose. A
//! language-model backed composer can replace it without touching the generator.

use super::links::Link;
use super::plan::SectionKind;
use crate::curriculum::{Topic, UNKNOWN_CATEGORY};
use crate::error::ComposeError;
use async_trait::async_trait;

/// Everything a composer needs to write one section
#[derive(Debug, Clone, Copy)]
pub struct SectionContext<'a> {
    pub topic: &'a Topic,
    pub kind: SectionKind,
    pub key_points: &'a [String],
    /// Links this section is expected to cite inline
    pub links: &'a [Link],
}

#[async_trait]
pub trait ContentComposer: Send + Sync {
    /// Body text of one section, without its heading
    async fn compose(&self, ctx: &SectionContext<'_>) -> Result<String, ComposeError>;

    fn name(&self) -> &str;
}

/// `направления «X»` for a known category, a neutral phrase otherwise
pub(crate) fn scope_phrase(topic: &Topic) -> String {
    let category = topic.category_name.trim();
    if category.is_empty() || category == UNKNOWN_CATEGORY {
        "междисциплинарного знания".to_string()
    } else {
        format!("направления «{}»", category)
    }
}

pub(crate) fn cite(links: &[Link]) -> String {
    links
        .iter()
        .map(Link::markdown)
        .collect::<Vec<_>>()
        .join(", ")
}

const INTRO: [&str; 3] = [
    "«{title}» — это область знаний, которая изучает фундаментальные понятия, принципы и закономерности своего предмета и задает общий язык для специалистов. В рамках {scope} эта тема формирует базовый словарь, без которого трудно понимать более сложные разделы и читать профессиональную литературу.",
    "Представления о теме «{title}» складывались постепенно: ранние идеи уточнялись, проверялись на практике и дополнялись новыми результатами исследований. Сегодня эта область активно развивается, а ее методы регулярно пересматриваются с учетом новых данных, инструментов и требований общества.",
    "В основе изучения лежат несколько устойчивых принципов: точность определений, опора на проверяемые факты и последовательное движение от простого к сложному. Освоение этих принципов помогает развивать критическое мышление и переносить полученные знания в новые, ранее незнакомые ситуации.",
];

const TECHNOLOGY: [&str; 3] = [
    "Для работы с темой «{title}» используется широкий набор инструментов и технологий, от классических методов анализа до современных цифровых средств. Выбор инструмента зависит от задачи: одни средства подходят для сбора и обработки данных, другие для моделирования, визуализации и проверки гипотез.",
    "Значительная часть практики опирается на специализированное программное обеспечение, онлайн-платформы и открытые библиотеки материалов. Такие платформы упрощают совместную работу, позволяют воспроизводить результаты и делают обучение доступным для людей из разных стран и профессиональных сообществ.",
    "Важную роль играют стандарты, терминологические соглашения и спецификации, принятые профессиональным сообществом. Они обеспечивают согласованность результатов, облегчают обмен знаниями между специалистами и помогают оценивать качество используемых источников и данных.",
];

const PROCESSES: [&str; 3] = [
    "Типичный рабочий процесс в области «{title}» начинается с постановки вопроса и сбора исходной информации, а затем переходит к анализу, интерпретации и проверке выводов. Каждый шаг документируется, чтобы результаты можно было воспроизвести, обсудить с коллегами и при необходимости уточнить.",
    "Специалисты применяют проверенные методологии и практики: систематический обзор источников, сравнение альтернативных подходов, экспериментальную проверку и критический разбор ошибок. Такой подход снижает риск поспешных выводов и делает знания более надежными и применимыми.",
    "Работа обычно организована циклически: планирование, реализация, оценка результатов и корректировка исходных предположений. Каждый новый этап опирается на итоги предыдущего, поэтому понимание темы углубляется постепенно, а навыки закрепляются в практических заданиях.",
];

const APPLICATIONS: [&str; 3] = [
    "Знания из области «{title}» находят широкое применение в образовании, исследованиях и повседневной профессиональной деятельности. Они помогают формулировать задачи точнее, выбирать подходящие методы решения и обоснованно оценивать последствия принятых решений.",
    "Реальные примеры использования включают учебные проекты, прикладные исследования, аналитическую работу и разработку новых продуктов и услуг. В каждом из этих случаев тема «{title}» дает практический инструментарий для решения конкретных проблем и проверки идей на практике.",
    "Организации и компании используют эти знания для улучшения процессов, снижения рисков и поиска новых возможностей для развития. Накопленный опыт показывает, что систематическое применение таких методов повышает качество решений и помогает командам работать эффективнее.",
];

const INTERSECTIONS: [&str; 3] = [
    "Тема «{title}» тесно связана с другими дисциплинами и образует разветвленную сеть междисциплинарных взаимодействий. Понимание этих связей позволяет применять знания шире и находить нестандартные решения на стыке разных подходов.",
    "Междисциплинарные аспекты проявляются в совместных исследованиях, где методы одной области помогают ответить на вопросы другой. Интеграция идей из естественных, гуманитарных и социальных наук обогащает практику и открывает новые направления для исследований.",
    "К смежным областям знаний относятся направления, с которыми тема «{title}» делит понятия, методы или объекты изучения, в том числе в рамках {scope}. Изучение этих областей в комплексе помогает увидеть целостную картину и осознанно выстраивать собственную траекторию обучения.",
];

/// Deterministic composer: one paragraph per section, two sentences per key point.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateComposer;

impl TemplateComposer {
    fn templates(kind: SectionKind) -> &'static [&'static str; 3] {
        match kind {
            SectionKind::Intro => &INTRO,
            SectionKind::Technology => &TECHNOLOGY,
            SectionKind::Processes => &PROCESSES,
            SectionKind::Applications => &APPLICATIONS,
            SectionKind::Intersections => &INTERSECTIONS,
        }
    }

    fn closing(kind: SectionKind, links: &[Link]) -> Option<String> {
        if links.is_empty() {
            return None;
        }
        let cited = cite(links);
        Some(match kind {
            SectionKind::Technology => {
                format!("Подробные материалы и документация собраны в ресурсе {}.", cited)
            }
            SectionKind::Applications => {
                format!("Примеры практического применения приведены в ресурсе {}.", cited)
            }
            _ => format!("Дополнительные сведения можно найти в ресурсе {}.", cited),
        })
    }
}

#[async_trait]
impl ContentComposer for TemplateComposer {
    async fn compose(&self, ctx: &SectionContext<'_>) -> Result<String, ComposeError> {
        if ctx.key_points.is_empty() {
            return Err(ComposeError {
                section: ctx.kind.to_string(),
                message: "plan has no key points".to_string(),
            });
        }

        let title = ctx.topic.title.trim();
        let scope = scope_phrase(ctx.topic);
        let templates = Self::templates(ctx.kind);

        let mut sentences: Vec<String> = ctx
            .key_points
            .iter()
            .enumerate()
            .map(|(index, point)| {
                let body = templates[index % templates.len()]
                    .replace("{title}", title)
                    .replace("{scope}", &scope);
                format!("{}. {}", point.trim_end_matches('.'), body)
            })
            .collect();
        if let Some(closing) = Self::closing(ctx.kind, ctx.links) {
            sentences.push(closing);
        }
        Ok(sentences.join(" "))
    }

    fn name(&self) -> &str {
        "template"
    }
}
