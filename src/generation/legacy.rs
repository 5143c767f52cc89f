//! Short phrase-template composer kept as a fast fallback.
//!
//! Output is far shorter than the template composer and usually fails the
//! word-count check; it exists for quick previews. Phrase choice is a pure
//! function of the title and a seed so runs are reproducible.

use super::composer::{cite, ContentComposer, SectionContext};
use super::plan::SectionKind;
use crate::error::ComposeError;
use async_trait::async_trait;

const INTRO_PHRASES: [&str; 5] = [
    "изучает фундаментальные принципы и закономерности",
    "объединяет теоретические основы и практические применения",
    "исследует ключевые аспекты и механизмы",
    "анализирует структуру и функционирование систем",
    "рассматривает основные концепции и их взаимосвязи",
];

const TECH_PHRASES: [&str; 5] = [
    "систематический анализ, моделирование процессов и экспериментальную верификацию",
    "математические методы, вычислительные алгоритмы и аналитические инструменты",
    "теоретические модели, практические техники и современные технологии",
    "концептуальные фреймворки, методологические подходы и инструментальные средства",
    "фундаментальные теории, прикладные методы и инновационные решения",
];

const PROCESS_PHRASES: [&str; 5] = [
    "последовательное изучение базовых концепций, практическую отработку навыков и критический анализ результатов",
    "формулирование гипотез, проведение исследований и интерпретацию данных",
    "систематизацию знаний, разработку моделей и их валидацию",
    "анализ проблемных ситуаций, синтез решений и оценку эффективности",
    "изучение теоретических основ, освоение практических методов и развитие критического мышления",
];

const INTERSECTION_PHRASES: [&str; 5] = [
    "математикой, физикой, информатикой и инженерными науками",
    "естественными науками, технологиями и социальными исследованиями",
    "теоретическими дисциплинами, прикладными областями и междисциплинарными проектами",
    "фундаментальными исследованиями, технологическими разработками и практическими приложениями",
    "различными научными направлениями, создавая целостную картину знаний",
];

/// Picks one phrase per section from fixed tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyComposer {
    seed: u64,
}

impl LegacyComposer {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn pick<'a>(&self, phrases: &'a [&'a str], title: &str) -> &'a str {
        let index = (title.chars().count() as u64).wrapping_add(self.seed) % phrases.len() as u64;
        phrases[index as usize]
    }
}

#[async_trait]
impl ContentComposer for LegacyComposer {
    async fn compose(&self, ctx: &SectionContext<'_>) -> Result<String, ComposeError> {
        let title = ctx.topic.title.trim();
        let text = match ctx.kind {
            SectionKind::Intro => format!(
                "{} — это важная область знаний, которая {}. Понимание этой дисциплины критично для современного образования и профессионального развития.",
                title,
                self.pick(&INTRO_PHRASES, title)
            ),
            SectionKind::Technology => {
                let mut text = format!(
                    "Основные концепции и инструменты включают {}. Современные подходы используют как классические методы, так и новейшие технологии для решения практических задач. Теоретическая база постоянно развивается, интегрируя новые открытия и методологии",
                    self.pick(&TECH_PHRASES, title)
                );
                if !ctx.links.is_empty() {
                    text.push_str(&format!(" из различных источников, включая {}", cite(ctx.links)));
                }
                text.push('.');
                text
            }
            SectionKind::Processes => format!(
                "Типичные процессы и методологии в этой области включают {}. Практическое применение требует систематического подхода, начиная с фундаментальных принципов и постепенно переходя к более сложным концепциям.",
                self.pick(&PROCESS_PHRASES, title)
            ),
            SectionKind::Applications => {
                let mut text = format!(
                    "Применение темы «{}» охватывает широкий спектр областей: от академических исследований до промышленных приложений и решения практических задач.",
                    title
                );
                if !ctx.links.is_empty() {
                    text.push_str(&format!(
                        " Для углубленного изучения рекомендуется обратиться к ресурсам {}.",
                        cite(ctx.links)
                    ));
                }
                text
            }
            SectionKind::Intersections => format!(
                "Эта дисциплина пересекается с {}, создавая синергетические эффекты и открывая новые возможности для инноваций. Глубокое понимание этих связей позволяет эффективно решать комплексные междисциплинарные задачи.",
                self.pick(&INTERSECTION_PHRASES, title)
            ),
        };
        Ok(text)
    }

    fn name(&self) -> &str {
        "legacy"
    }
}
