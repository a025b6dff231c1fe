//! The recommendation quiz: questions, answers, and a pure state reducer.
//!
//! The UI never mutates quiz state in place. Every key press becomes a
//! [`QuizAction`] and [`reduce`] returns the next [`QuizState`]; once the last
//! question is confirmed the state carries a finalized [`QuizResult`].

use crate::catalog::format_amount;
use crate::error_handling::{CatalogError, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Budget answer meaning "no constraint".
pub const NO_BUDGET_LIMIT: f64 = 10000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Experience {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Professional,
}

impl Experience {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "beginner" => Some(Experience::Beginner),
            "intermediate" => Some(Experience::Intermediate),
            "advanced" => Some(Experience::Advanced),
            "professional" | "expert" => Some(Experience::Professional),
            _ => None,
        }
    }

    /// Ordinal level on the same 1..=4 scale as catalog difficulty.
    pub fn level(self) -> u8 {
        match self {
            Experience::Beginner => 1,
            Experience::Intermediate => 2,
            Experience::Advanced => 3,
            Experience::Professional => 4,
        }
    }

    pub fn from_level(level: u8) -> Self {
        match level {
            2 => Experience::Intermediate,
            3 => Experience::Advanced,
            4 => Experience::Professional,
            _ => Experience::Beginner,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Experience::Beginner => "beginner",
            Experience::Intermediate => "intermediate",
            Experience::Advanced => "advanced",
            Experience::Professional => "professional",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionId {
    PrimaryUse,
    Experience,
    Budget,
    Platform,
    Features,
}

#[derive(Debug)]
pub struct QuizOption {
    pub value: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

#[derive(Debug)]
pub struct Question {
    pub id: QuestionId,
    pub title: &'static str,
    pub subtitle: &'static str,
    /// Multi-select questions toggle options instead of replacing the answer.
    pub multiple: bool,
    pub options: &'static [QuizOption],
}

impl Question {
    pub fn option(&self, value: &str) -> Option<&'static QuizOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

const fn opt(value: &'static str, label: &'static str, description: &'static str) -> QuizOption {
    QuizOption { value, label, description }
}

pub static QUESTIONS: [Question; 5] = [
    Question {
        id: QuestionId::PrimaryUse,
        title: "What will you primarily use CAD software for?",
        subtitle: "Select your main use case",
        multiple: false,
        options: &[
            opt("mechanical", "Mechanical Design & Engineering", "Parts, assemblies, product design"),
            opt("architectural", "Architecture & Construction", "Buildings, floor plans, structures"),
            opt("3dprinting", "3D Printing & Prototyping", "Models for 3D printing, rapid prototyping"),
            opt("industrial", "Industrial Design", "Consumer products, aesthetics, ergonomics"),
            opt("jewelry", "Jewelry Design", "Rings, pendants, custom jewelry"),
            opt("electronics", "Electronics & PCB Design", "Circuit boards, electronic enclosures"),
            opt("animation", "3D Animation & Modeling", "Characters, scenes, visual effects"),
            opt("any", "General Purpose", "Multiple use cases"),
        ],
    },
    Question {
        id: QuestionId::Experience,
        title: "What is your experience level with CAD software?",
        subtitle: "This helps us recommend appropriate complexity",
        multiple: false,
        options: &[
            opt("beginner", "Beginner", "New to CAD, need user-friendly interface"),
            opt("intermediate", "Intermediate", "Some CAD experience, comfortable with learning"),
            opt("advanced", "Advanced", "Experienced user, need powerful features"),
            opt("professional", "Professional", "Industry expert, need enterprise features"),
        ],
    },
    Question {
        id: QuestionId::Budget,
        title: "What is your budget range per month?",
        subtitle: "Select your preferred pricing tier",
        multiple: false,
        options: &[
            opt("0", "Free", "Open source or free versions only"),
            opt("50", "$0 - $50/month", "Personal or small business budget"),
            opt("200", "$50 - $200/month", "Professional individual license"),
            opt("500", "$200 - $500/month", "Small team or advanced features"),
            opt("1000", "$500 - $1000/month", "Enterprise features"),
            opt("10000", "$1000+/month", "No budget constraints"),
        ],
    },
    Question {
        id: QuestionId::Platform,
        title: "What platform do you prefer?",
        subtitle: "Choose your operating system",
        multiple: false,
        options: &[
            opt("windows", "Windows", "Windows 10/11"),
            opt("mac", "macOS", "Mac computers"),
            opt("linux", "Linux", "Linux distributions"),
            opt("web", "Web Browser", "Browser-based, any platform"),
            opt("any", "No Preference", "Any platform is fine"),
        ],
    },
    Question {
        id: QuestionId::Features,
        title: "Which features are most important to you?",
        subtitle: "Select your top priorities (choose multiple)",
        multiple: true,
        options: &[
            opt("simulation", "Simulation & Analysis", "FEA, CFD, stress testing"),
            opt("collaboration", "Team Collaboration", "Cloud sharing, version control"),
            opt("rendering", "Photorealistic Rendering", "High-quality visualizations"),
            opt("parametric", "Parametric Modeling", "History-based, editable features"),
            opt("assembly", "Large Assembly Handling", "Complex multi-part designs"),
            opt("drafting", "2D Drafting & Documentation", "Technical drawings, blueprints"),
            opt("manufacturing", "Manufacturing Integration", "CAM, toolpaths, production"),
        ],
    },
];

/// Answers collected so far; any of them may still be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizAnswers {
    pub primary_use: Option<String>,
    pub experience: Option<String>,
    pub budget: Option<f64>,
    pub platform: Option<String>,
    pub features: Option<Vec<String>>,
}

impl QuizAnswers {
    pub fn is_answered(&self, question: QuestionId) -> bool {
        match question {
            QuestionId::PrimaryUse => self.primary_use.is_some(),
            QuestionId::Experience => self.experience.is_some(),
            QuestionId::Budget => self.budget.is_some(),
            QuestionId::Platform => self.platform.is_some(),
            QuestionId::Features => self.features.as_ref().is_some_and(|f| !f.is_empty()),
        }
    }

    /// Whether every question has an answer.
    pub fn is_complete(&self) -> bool {
        QUESTIONS.iter().all(|q| self.is_answered(q.id))
    }

    /// Fills the gaps in these answers from `base`.
    pub fn layered_over(self, base: QuizAnswers) -> QuizAnswers {
        QuizAnswers {
            primary_use: self.primary_use.or(base.primary_use),
            experience: self.experience.or(base.experience),
            budget: self.budget.or(base.budget),
            platform: self.platform.or(base.platform),
            features: self.features.filter(|f| !f.is_empty()).or(base.features),
        }
    }

    pub fn is_selected(&self, question: QuestionId, value: &str) -> bool {
        match question {
            QuestionId::PrimaryUse => self.primary_use.as_deref() == Some(value),
            QuestionId::Experience => self.experience.as_deref() == Some(value),
            QuestionId::Budget => value.parse::<f64>().ok().is_some_and(|v| self.budget == Some(v)),
            QuestionId::Platform => self.platform.as_deref() == Some(value),
            QuestionId::Features => self.features.as_ref().is_some_and(|f| f.iter().any(|x| x == value)),
        }
    }

    /// Finalizes the answers, falling back to the documented defaults for
    /// anything left unanswered.
    pub fn finalize(&self) -> QuizResult {
        let experience = self
            .experience
            .as_deref()
            .and_then(Experience::parse)
            .unwrap_or_default();

        QuizResult {
            primary_use: self.primary_use.clone().unwrap_or_else(|| "any".to_string()),
            experience,
            budget: self.budget.filter(|b| b.is_finite() && *b >= 0.0).unwrap_or(0.0),
            platform: self.platform.clone().unwrap_or_else(|| "any".to_string()),
            features: self.features.clone().unwrap_or_default(),
            experience_level: experience.level(),
        }
    }
}

/// Finalized quiz answers, ready for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub primary_use: String,
    pub experience: Experience,
    /// Monthly ceiling; [`NO_BUDGET_LIMIT`] means unconstrained.
    pub budget: f64,
    pub platform: String,
    pub features: Vec<String>,
    /// 1..=4, derived from `experience`.
    pub experience_level: u8,
}

impl Default for QuizResult {
    fn default() -> Self {
        QuizAnswers::default().finalize()
    }
}

impl From<&QuizResult> for QuizAnswers {
    fn from(result: &QuizResult) -> Self {
        QuizAnswers {
            primary_use: Some(result.primary_use.clone()),
            experience: Some(result.experience.as_str().to_string()),
            budget: Some(result.budget),
            platform: Some(result.platform.clone()),
            features: Some(result.features.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuizAction {
    /// Select a single-select option, or toggle a multi-select one.
    Choose(String),
    Next,
    Previous,
    /// Pre-fill answers from an earlier session.
    Restore(QuizAnswers),
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuizState {
    pub step: usize,
    pub answers: QuizAnswers,
    /// Set once the last question has been confirmed.
    pub result: Option<QuizResult>,
}

impl QuizState {
    pub fn question(&self) -> &'static Question {
        &QUESTIONS[self.step.min(QUESTIONS.len() - 1)]
    }

    pub fn can_proceed(&self) -> bool {
        self.answers.is_answered(self.question().id)
    }

    pub fn is_last_step(&self) -> bool {
        self.step + 1 >= QUESTIONS.len()
    }

    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    /// Percentage of questions reached, counting the current one.
    pub fn progress_percent(&self) -> u16 {
        (((self.step + 1) * 100) / QUESTIONS.len()) as u16
    }
}

fn choose(answers: &QuizAnswers, question: &Question, value: &str) -> QuizAnswers {
    let mut next = answers.clone();
    match question.id {
        QuestionId::PrimaryUse => next.primary_use = Some(value.to_string()),
        QuestionId::Experience => next.experience = Some(value.to_string()),
        QuestionId::Budget => next.budget = value.parse().ok().or(next.budget),
        QuestionId::Platform => next.platform = Some(value.to_string()),
        QuestionId::Features => {
            let mut features = next.features.take().unwrap_or_default();
            if let Some(pos) = features.iter().position(|f| f == value) {
                features.remove(pos);
            } else {
                features.push(value.to_string());
            }
            next.features = Some(features);
        }
    }
    next
}

/// Computes the next quiz state. Invalid actions return the state unchanged.
pub fn reduce(state: &QuizState, action: QuizAction) -> QuizState {
    match action {
        QuizAction::Choose(value) => {
            let question = state.question();
            if state.is_complete() || question.option(&value).is_none() {
                return state.clone();
            }
            QuizState {
                answers: choose(&state.answers, question, &value),
                ..state.clone()
            }
        }
        QuizAction::Next => {
            if state.is_complete() || !state.can_proceed() {
                state.clone()
            } else if state.is_last_step() {
                QuizState {
                    result: Some(state.answers.finalize()),
                    ..state.clone()
                }
            } else {
                QuizState {
                    step: state.step + 1,
                    ..state.clone()
                }
            }
        }
        QuizAction::Previous => QuizState {
            step: state.step.saturating_sub(1),
            result: None,
            ..state.clone()
        },
        QuizAction::Restore(answers) => QuizState {
            step: 0,
            answers,
            result: None,
        },
        QuizAction::Reset => QuizState::default(),
    }
}

/// Human readable budget, as shown in the results header.
pub fn budget_label(budget: f64) -> String {
    if budget >= NO_BUDGET_LIMIT {
        "$1000+".to_string()
    } else if budget == 0.0 {
        "Free".to_string()
    } else {
        format_amount(budget)
    }
}

/// Answers for a run outside the interactive quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAnswers {
    pub result: QuizResult,
    /// Whether `result` should replace the remembered answers.
    pub remember: bool,
}

/// Combines explicitly given answers with the remembered ones.
///
/// Remembered answers are only consulted when `use_saved` is set, which
/// requires a store. The result is worth remembering when it built on the
/// saved answers or when every question was answered explicitly; a partial
/// one-off query must not overwrite a finished quiz with defaults.
pub fn resolve_answers(
    explicit: QuizAnswers,
    store: Option<&AnswerStore>,
    use_saved: bool,
) -> Result<ResolvedAnswers> {
    let base = if use_saved {
        let store = store.ok_or_else(|| {
            CatalogError::Config("saved answers were requested but none are kept \
                 (quiz.remember_answers is off or there is no data directory)"
                .to_string())
        })?;
        store.load()?.map(|saved| QuizAnswers::from(&saved)).unwrap_or_default()
    } else {
        QuizAnswers::default()
    };

    let remember = use_saved || explicit.is_complete();
    Ok(ResolvedAnswers {
        result: explicit.layered_over(base).finalize(),
        remember,
    })
}

/// Remembers the last finalized quiz between sessions.
pub struct AnswerStore {
    path: PathBuf,
}

impl AnswerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data_dir>/cadguide/quiz-answers.json`, if the platform has a data dir.
    pub fn default_location() -> Option<Self> {
        dirs::data_dir().map(|d| Self::new(d.join("cadguide").join("quiz-answers.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `Ok(None)` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<QuizResult>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read saved answers from '{}'", self.path.display()))?;
        let result = serde_json::from_str(&content)
            .with_context(|| format!("Saved answers in '{}' are corrupt", self.path.display()))?;
        Ok(Some(result))
    }

    pub fn save(&self, result: &QuizResult) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create '{}'", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(result)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write saved answers to '{}'", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), "Saved quiz answers");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(actions: Vec<QuizAction>) -> QuizState {
        actions
            .into_iter()
            .fold(QuizState::default(), |state, action| reduce(&state, action))
    }

    fn choose(value: &str) -> QuizAction {
        QuizAction::Choose(value.to_string())
    }

    #[test]
    fn test_full_quiz_produces_result() {
        let state = run(vec![
            choose("mechanical"),
            QuizAction::Next,
            choose("advanced"),
            QuizAction::Next,
            choose("200"),
            QuizAction::Next,
            choose("linux"),
            QuizAction::Next,
            choose("parametric"),
            choose("simulation"),
            QuizAction::Next,
        ]);

        let result = state.result.expect("quiz should be complete");
        assert_eq!(result.primary_use, "mechanical");
        assert_eq!(result.experience, Experience::Advanced);
        assert_eq!(result.experience_level, 3);
        assert_eq!(result.budget, 200.0);
        assert_eq!(result.platform, "linux");
        assert_eq!(result.features, vec!["parametric".to_string(), "simulation".to_string()]);
    }

    #[test]
    fn test_next_requires_an_answer() {
        let state = run(vec![QuizAction::Next]);
        assert_eq!(state.step, 0);

        let state = run(vec![choose("any"), QuizAction::Next]);
        assert_eq!(state.step, 1);
    }

    #[test]
    fn test_features_toggle_and_need_one_selection() {
        let mut state = QuizState { step: 4, ..QuizState::default() };
        state = reduce(&state, choose("rendering"));
        state = reduce(&state, choose("rendering"));
        assert_eq!(state.answers.features, Some(vec![]));
        assert!(!state.can_proceed());

        state = reduce(&state, QuizAction::Next);
        assert!(state.result.is_none());
    }

    #[test]
    fn test_choose_ignores_unknown_options() {
        let state = run(vec![choose("knitting")]);
        assert_eq!(state, QuizState::default());
    }

    #[test]
    fn test_previous_stops_at_first_question() {
        let state = run(vec![choose("any"), QuizAction::Next, QuizAction::Previous, QuizAction::Previous]);
        assert_eq!(state.step, 0);
        assert_eq!(state.answers.primary_use.as_deref(), Some("any"));
    }

    #[test]
    fn test_restore_prefills_answers() {
        let previous = QuizResult {
            primary_use: "jewelry".to_string(),
            experience: Experience::Intermediate,
            budget: 50.0,
            platform: "mac".to_string(),
            features: vec!["rendering".to_string()],
            experience_level: 2,
        };
        let state = run(vec![QuizAction::Restore(QuizAnswers::from(&previous))]);

        assert!(state.can_proceed());
        assert!(state.answers.is_selected(QuestionId::Budget, "50"));
        assert_eq!(state.answers.finalize(), previous);
    }

    #[test]
    fn test_finalize_defaults() {
        let result = QuizAnswers::default().finalize();
        assert_eq!(result.primary_use, "any");
        assert_eq!(result.experience, Experience::Beginner);
        assert_eq!(result.experience_level, 1);
        assert_eq!(result.budget, 0.0);
        assert_eq!(result.platform, "any");
        assert!(result.features.is_empty());
    }

    #[test]
    fn test_unknown_experience_maps_to_beginner() {
        let answers = QuizAnswers {
            experience: Some("wizard".to_string()),
            ..QuizAnswers::default()
        };
        assert_eq!(answers.finalize().experience_level, 1);
    }

    #[test]
    fn test_progress_and_budget_label() {
        let state = QuizState { step: 2, ..QuizState::default() };
        assert_eq!(state.progress_percent(), 60);
        assert_eq!(budget_label(NO_BUDGET_LIMIT), "$1000+");
        assert_eq!(budget_label(0.0), "Free");
        assert_eq!(budget_label(200.0), "$200");
    }

    #[test]
    fn test_answer_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnswerStore::new(dir.path().join("nested").join("answers.json"));
        assert!(store.load().unwrap().is_none());

        let result = QuizAnswers {
            primary_use: Some("architectural".to_string()),
            ..QuizAnswers::default()
        }
        .finalize();
        store.save(&result).unwrap();

        assert_eq!(store.load().unwrap(), Some(result));
    }

    fn saved_store(dir: &Path) -> AnswerStore {
        let store = AnswerStore::new(dir.join("answers.json"));
        let finished = QuizAnswers {
            primary_use: Some("mechanical".to_string()),
            experience: Some("advanced".to_string()),
            budget: Some(200.0),
            platform: Some("windows".to_string()),
            features: Some(vec!["simulation".to_string()]),
        }
        .finalize();
        store.save(&finished).unwrap();
        store
    }

    #[test]
    fn test_partial_explicit_answers_are_not_remembered() {
        let dir = tempfile::tempdir().unwrap();
        let store = saved_store(dir.path());
        let one_off = QuizAnswers {
            primary_use: Some("jewelry".to_string()),
            ..QuizAnswers::default()
        };

        let resolved = resolve_answers(one_off, Some(&store), false).unwrap();

        assert!(!resolved.remember);
        assert_eq!(resolved.result.primary_use, "jewelry");
        assert_eq!(resolved.result.budget, 0.0);
    }

    #[test]
    fn test_complete_explicit_answers_are_remembered() {
        let explicit = QuizAnswers {
            primary_use: Some("architectural".to_string()),
            experience: Some("beginner".to_string()),
            budget: Some(50.0),
            platform: Some("mac".to_string()),
            features: Some(vec!["rendering".to_string()]),
        };
        assert!(explicit.is_complete());

        let resolved = resolve_answers(explicit, None, false).unwrap();
        assert!(resolved.remember);
    }

    #[test]
    fn test_saved_answers_fill_gaps_and_are_remembered() {
        let dir = tempfile::tempdir().unwrap();
        let store = saved_store(dir.path());
        let overrides = QuizAnswers {
            budget: Some(500.0),
            ..QuizAnswers::default()
        };

        let resolved = resolve_answers(overrides, Some(&store), true).unwrap();

        assert!(resolved.remember);
        assert_eq!(resolved.result.budget, 500.0);
        assert_eq!(resolved.result.primary_use, "mechanical");
        assert_eq!(resolved.result.experience, Experience::Advanced);
        assert_eq!(resolved.result.features, vec!["simulation".to_string()]);
    }

    #[test]
    fn test_saved_answers_without_a_store_is_an_error() {
        let err = resolve_answers(QuizAnswers::default(), None, true).unwrap_err();
        assert!(matches!(err.downcast_ref::<CatalogError>(), Some(CatalogError::Config(_))));
    }

    #[test]
    fn test_answer_store_reports_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(AnswerStore::new(path).load().is_err());
    }
}
