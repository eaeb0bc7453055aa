//! Static fallback question sets.
//!
//! Used whenever the provider is not configured or its output is unusable.
//! Lookups are pure and never fail: an exact `(category, step)` entry wins,
//! otherwise the generic set for the step is returned.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::domain::foundation::QuestionId;
use crate::domain::questionnaire::{Question, QuestionKind, QuestionSet, QuestionStep};

static BUILTIN: Lazy<FallbackCatalog> = Lazy::new(FallbackCatalog::build_builtin);

/// Deterministic question sets keyed by category and step.
#[derive(Debug, Clone)]
pub struct FallbackCatalog {
    exact: HashMap<(String, QuestionStep), QuestionSet>,
    generic: HashMap<QuestionStep, QuestionSet>,
}

impl FallbackCatalog {
    /// Returns the shared built-in catalog.
    pub fn builtin() -> &'static FallbackCatalog {
        &BUILTIN
    }

    /// Creates a catalog from generic per-step defaults only.
    pub fn with_generic(
        manufacturing: QuestionSet,
        testing: QuestionSet,
        environmental: QuestionSet,
    ) -> Self {
        let generic = [
            (QuestionStep::Manufacturing, manufacturing),
            (QuestionStep::Testing, testing),
            (QuestionStep::Environmental, environmental),
        ]
        .into_iter()
        .collect();

        Self {
            exact: HashMap::new(),
            generic,
        }
    }

    /// Registers an exact set for a category and step.
    pub fn register(
        mut self,
        category: impl Into<String>,
        step: QuestionStep,
        questions: QuestionSet,
    ) -> Self {
        self.exact.insert((category.into(), step), questions);
        self
    }

    /// Returns true if an exact set exists for the pair.
    pub fn has_exact(&self, category: &str, step: QuestionStep) -> bool {
        self.exact.contains_key(&(category.to_string(), step))
    }

    /// Returns the exact set for the pair, or the generic set for the step.
    pub fn lookup(&self, category: &str, step: QuestionStep) -> QuestionSet {
        self.exact
            .get(&(category.to_string(), step))
            .or_else(|| self.generic.get(&step))
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the categories with at least one exact set.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self.exact.keys().map(|(c, _)| c.as_str()).collect();
        categories.sort_unstable();
        categories.dedup();
        categories
    }

    fn build_builtin() -> Self {
        use QuestionStep::*;

        Self::with_generic(generic_manufacturing(), generic_testing(), generic_environmental())
            .register("food", Manufacturing, food_manufacturing())
            .register("food", Testing, food_testing())
            .register("food", Environmental, food_environmental())
            .register("personal-care", Manufacturing, personal_care_manufacturing())
            .register("personal-care", Testing, personal_care_testing())
            .register("personal-care", Environmental, personal_care_environmental())
            .register("electronics", Manufacturing, electronics_manufacturing())
            .register("electronics", Testing, electronics_testing())
            .register("electronics", Environmental, electronics_environmental())
            .register("cosmetics", Manufacturing, cosmetics_manufacturing())
            .register("cosmetics", Testing, cosmetics_testing())
            .register("cosmetics", Environmental, cosmetics_environmental())
            .register("pharmaceuticals", Manufacturing, pharmaceuticals_manufacturing())
            .register("pharmaceuticals", Testing, pharmaceuticals_testing())
            .register("pharmaceuticals", Environmental, pharmaceuticals_environmental())
    }
}

// ----- Catalog construction helpers -----

fn question(
    id: &'static str,
    prompt: &'static str,
    kind: QuestionKind,
    required: bool,
    options: &[&str],
) -> Question {
    Question {
        id: QuestionId::from_static(id),
        prompt: prompt.to_string(),
        kind,
        required,
        options: options.iter().map(|o| o.to_string()).collect(),
    }
}

fn text(id: &'static str, prompt: &'static str, required: bool) -> Question {
    question(id, prompt, QuestionKind::Text, required, &[])
}

fn number(id: &'static str, prompt: &'static str, required: bool) -> Question {
    question(id, prompt, QuestionKind::Number, required, &[])
}

fn yes_no(id: &'static str, prompt: &'static str, required: bool) -> Question {
    question(id, prompt, QuestionKind::Boolean, required, &[])
}

fn select(id: &'static str, prompt: &'static str, required: bool, options: &[&str]) -> Question {
    question(id, prompt, QuestionKind::Select, required, options)
}

fn multi(id: &'static str, prompt: &'static str, required: bool, options: &[&str]) -> Question {
    question(id, prompt, QuestionKind::MultiSelect, required, options)
}

const AUDIT_FREQUENCY: &[&str] = &["Monthly", "Quarterly", "Annually", "Never"];
const TEST_FREQUENCY: &[&str] = &["Every batch", "Weekly", "Monthly", "Quarterly"];
const PRESERVATIVES: &[&str] = &["Parabens", "Phenoxyethanol", "Natural preservatives", "None"];

// ----- Generic defaults -----

fn generic_manufacturing() -> QuestionSet {
    QuestionSet::new(vec![
        text("mfg_1", "Where are the main components sourced from?", true),
        yes_no("mfg_2", "Is the manufacturing facility certified?", true),
        select("mfg_3", "How often are suppliers audited?", false, AUDIT_FREQUENCY),
    ])
}

fn generic_testing() -> QuestionSet {
    QuestionSet::new(vec![
        multi(
            "test_1",
            "What safety certifications does the product have?",
            true,
            &["ISO", "CE", "FDA", "None"],
        ),
        yes_no("test_2", "Are third-party laboratories used for testing?", true),
        select("test_3", "How often is quality testing performed?", true, TEST_FREQUENCY),
    ])
}

fn generic_environmental() -> QuestionSet {
    QuestionSet::new(vec![
        yes_no("env_1", "Is the packaging recyclable?", true),
        number("env_2", "What percentage of materials are sustainable?", false),
        yes_no("env_3", "Is the manufacturing process environmentally friendly?", false),
    ])
}

// ----- Food -----

fn food_manufacturing() -> QuestionSet {
    QuestionSet::new(vec![
        text("mfg_1", "Where are the main ingredients sourced from?", true),
        select(
            "mfg_2",
            "Are ingredients organic or conventional?",
            true,
            &["Organic", "Conventional", "Mixed"],
        ),
        yes_no("mfg_3", "Is the manufacturing facility certified?", true),
        select("mfg_4", "How often are suppliers audited?", false, AUDIT_FREQUENCY),
        multi(
            "mfg_5",
            "Are there any allergens in the facility?",
            false,
            &["Dairy", "Nuts", "Gluten", "Soy", "None"],
        ),
    ])
}

fn food_testing() -> QuestionSet {
    QuestionSet::new(vec![
        yes_no("test_1", "Is the product FDA approved?", true),
        multi(
            "test_2",
            "What food safety certifications does the product have?",
            true,
            &["HACCP", "ISO 22000", "FSSC 22000", "SQF", "None"],
        ),
        select(
            "test_3",
            "How often is the product tested for contaminants?",
            true,
            TEST_FREQUENCY,
        ),
        yes_no("test_4", "Are third-party laboratories used for testing?", true),
        text("test_5", "What is the shelf life testing protocol?", false),
    ])
}

fn food_environmental() -> QuestionSet {
    QuestionSet::new(vec![
        yes_no("env_1", "Is the packaging recyclable?", true),
        number(
            "env_2",
            "What percentage of packaging is made from recycled materials?",
            false,
        ),
        yes_no("env_3", "Is the product certified organic?", false),
        number("env_4", "What is the carbon footprint per unit?", false),
        yes_no("env_5", "Are sustainable farming practices used?", false),
    ])
}

// ----- Personal care -----

fn personal_care_manufacturing() -> QuestionSet {
    QuestionSet::new(vec![
        yes_no("mfg_1", "Are ingredients cruelty-free certified?", true),
        number(
            "mfg_2",
            "What percentage of ingredients are natural vs synthetic?",
            true,
        ),
        yes_no("mfg_3", "Is the manufacturing facility GMP certified?", true),
        yes_no("mfg_4", "Are ingredients tested for purity?", true),
        multi("mfg_5", "What preservatives are used?", false, PRESERVATIVES),
    ])
}

fn personal_care_testing() -> QuestionSet {
    QuestionSet::new(vec![
        yes_no("test_1", "Is the product dermatologically tested?", true),
        multi(
            "test_2",
            "What safety certifications does the product have?",
            true,
            &["FDA", "EU Cosmetics Regulation", "ISO 22716", "None"],
        ),
        yes_no("test_3", "Are ingredients tested for skin sensitivity?", true),
        yes_no("test_4", "Is the product tested for microbial contamination?", true),
        number("test_5", "What is the stability testing period?", false),
    ])
}

fn personal_care_environmental() -> QuestionSet {
    QuestionSet::new(vec![
        yes_no("env_1", "Is the packaging biodegradable?", true),
        yes_no("env_2", "Are ingredients sustainably sourced?", true),
        yes_no("env_3", "Is the product certified cruelty-free?", false),
        number("env_4", "What percentage of ingredients are biodegradable?", false),
        yes_no("env_5", "Is the manufacturing process carbon-neutral?", false),
    ])
}

// ----- Electronics -----

fn electronics_manufacturing() -> QuestionSet {
    QuestionSet::new(vec![
        text("mfg_1", "Where are electronic components manufactured?", true),
        yes_no("mfg_2", "Are conflict minerals avoided?", true),
        yes_no("mfg_3", "Is the manufacturing facility ISO certified?", true),
        multi(
            "mfg_4",
            "What quality control tests are performed?",
            true,
            &[
                "Safety testing",
                "Performance testing",
                "Durability testing",
                "Environmental testing",
            ],
        ),
        yes_no("mfg_5", "Are suppliers audited for labor practices?", false),
    ])
}

fn electronics_testing() -> QuestionSet {
    QuestionSet::new(vec![
        yes_no("test_1", "Is the product UL certified?", true),
        multi(
            "test_2",
            "What safety standards does the product meet?",
            true,
            &["CE", "FCC", "RoHS", "REACH", "None"],
        ),
        yes_no("test_3", "Is electromagnetic compatibility (EMC) tested?", true),
        yes_no("test_4", "Are drop and impact tests performed?", true),
        text("test_5", "What is the warranty testing protocol?", false),
    ])
}

fn electronics_environmental() -> QuestionSet {
    QuestionSet::new(vec![
        yes_no("env_1", "Is the product Energy Star certified?", false),
        yes_no("env_2", "Is the packaging made from recycled materials?", true),
        yes_no("env_3", "Is the product RoHS compliant?", true),
        number("env_4", "What is the power consumption in standby mode?", false),
        yes_no("env_5", "Is there a take-back program for recycling?", false),
    ])
}

// ----- Cosmetics -----

fn cosmetics_manufacturing() -> QuestionSet {
    QuestionSet::new(vec![
        yes_no("mfg_1", "Are ingredients vegan and cruelty-free?", true),
        number("mfg_2", "What percentage of ingredients are natural?", true),
        yes_no("mfg_3", "Is the manufacturing facility FDA registered?", true),
        yes_no("mfg_4", "Are ingredients tested for skin sensitivity?", true),
        multi("mfg_5", "What preservatives are used?", false, PRESERVATIVES),
    ])
}

fn cosmetics_testing() -> QuestionSet {
    QuestionSet::new(vec![
        yes_no("test_1", "Is the product dermatologically tested?", true),
        multi(
            "test_2",
            "What safety certifications does the product have?",
            true,
            &[
                "FDA",
                "EU Cosmetics Regulation",
                "ISO 22716",
                "Leaping Bunny",
                "None",
            ],
        ),
        yes_no("test_3", "Are ingredients tested for skin sensitivity?", true),
        yes_no("test_4", "Is the product tested for microbial contamination?", true),
        number("test_5", "What is the stability testing period?", false),
    ])
}

fn cosmetics_environmental() -> QuestionSet {
    QuestionSet::new(vec![
        yes_no("env_1", "Is the packaging recyclable?", true),
        yes_no("env_2", "Are ingredients sustainably sourced?", true),
        yes_no("env_3", "Is the product certified cruelty-free?", false),
        number("env_4", "What percentage of packaging is biodegradable?", false),
        yes_no("env_5", "Is the manufacturing process carbon-neutral?", false),
    ])
}

// ----- Pharmaceuticals -----

fn pharmaceuticals_manufacturing() -> QuestionSet {
    QuestionSet::new(vec![
        yes_no("mfg_1", "Is the manufacturing facility FDA approved?", true),
        yes_no("mfg_2", "Are ingredients USP grade?", true),
        yes_no("mfg_3", "Is the facility GMP certified?", true),
        select(
            "mfg_4",
            "How often is quality testing performed?",
            true,
            &["Every batch", "Daily", "Weekly", "Monthly"],
        ),
        yes_no("mfg_5", "Are ingredients tested for purity?", true),
    ])
}

fn pharmaceuticals_testing() -> QuestionSet {
    QuestionSet::new(vec![
        yes_no("test_1", "Is the product FDA approved?", true),
        text("test_2", "What clinical trials have been conducted?", true),
        yes_no("test_3", "Are ingredients tested for purity?", true),
        yes_no("test_4", "Is the product tested for efficacy?", true),
        text("test_5", "What is the shelf life testing protocol?", false),
    ])
}

fn pharmaceuticals_environmental() -> QuestionSet {
    QuestionSet::new(vec![
        yes_no("env_1", "Is the packaging recyclable?", true),
        yes_no("env_2", "Are ingredients sustainably sourced?", true),
        yes_no("env_3", "Is the product certified organic?", false),
        number("env_4", "What is the carbon footprint per unit?", false),
        yes_no("env_5", "Are sustainable manufacturing practices used?", false),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_lookup_returns_registered_set() {
        let set = FallbackCatalog::builtin().lookup("personal-care", QuestionStep::Testing);

        assert_eq!(set.len(), 5);
        let first = &set[0];
        assert_eq!(first.id.as_str(), "test_1");
        assert_eq!(first.prompt, "Is the product dermatologically tested?");
        assert_eq!(first.kind, QuestionKind::Boolean);
        assert!(first.required);
    }

    #[test]
    fn unknown_category_uses_generic_step_default() {
        let set = FallbackCatalog::builtin().lookup("widgets", QuestionStep::Environmental);

        assert_eq!(set.len(), 3);
        assert_eq!(set[0].prompt, "Is the packaging recyclable?");
        assert_eq!(set[1].kind, QuestionKind::Number);
    }

    #[test]
    fn every_step_has_a_non_empty_generic_default() {
        for step in QuestionStep::all() {
            assert!(!FallbackCatalog::builtin().lookup("", *step).is_empty());
        }
    }

    #[test]
    fn lookups_are_reference_identical() {
        let a = FallbackCatalog::builtin().lookup("food", QuestionStep::Manufacturing);
        let b = FallbackCatalog::builtin().lookup("food", QuestionStep::Manufacturing);
        assert!(QuestionSet::ptr_eq(&a, &b));
    }

    #[test]
    fn builtin_sets_are_structurally_valid_and_step_prefixed() {
        let catalog = FallbackCatalog::builtin();
        let mut categories = catalog.categories();
        categories.push("unlisted");

        for category in categories {
            for step in QuestionStep::all() {
                let set = catalog.lookup(category, *step);
                let mut ids: Vec<&str> = set.iter().map(|q| q.id.as_str()).collect();
                for q in set.iter() {
                    assert!(q.validate().is_ok(), "{} is invalid", q.id);
                    assert!(q.id.as_str().starts_with(step.id_prefix()));
                }
                ids.sort_unstable();
                ids.dedup();
                assert_eq!(ids.len(), set.len(), "duplicate ids in {}/{}", category, step);
            }
        }
    }

    #[test]
    fn builtin_covers_five_categories() {
        assert_eq!(
            FallbackCatalog::builtin().categories(),
            vec!["cosmetics", "electronics", "food", "personal-care", "pharmaceuticals"]
        );
        assert!(FallbackCatalog::builtin().has_exact("food", QuestionStep::Testing));
        assert!(!FallbackCatalog::builtin().has_exact("toys", QuestionStep::Testing));
    }
}
