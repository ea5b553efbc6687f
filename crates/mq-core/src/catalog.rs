//! Level catalog: static level definitions consumed by level and practice sessions
//!
//! The standard catalog ships ten levels that alternate between a single
//! grade and a two-grade blend. Custom catalogs load from JSON or YAML.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::types::{GradeTag, Operation};

/// Correct answers required to pass a standard level
pub const DEFAULT_REQUIRED_CORRECT: u32 = 10;
/// Time limit of the first two standard levels
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 90;
/// Extra time granted every two levels
pub const TIME_INCREMENT_EVERY_TWO_LEVELS_SECS: u64 = 60;

/// A single level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDefinition {
    pub id: String,
    pub level_number: u32,
    pub title: String,
    pub grade_tags: Vec<GradeTag>,
    pub allowed_operations: Vec<Operation>,
    pub required_correct_answers: u32,
    /// Ignored by practice sessions
    pub time_limit_seconds: u64,
}

impl LevelDefinition {
    /// Level with the standard goal and time limit for its number
    pub fn new(level_number: u32, grade_tags: &[GradeTag], allowed_operations: &[Operation]) -> Self {
        Self {
            id: format!("level-{}", level_number),
            level_number,
            title: format!("Level {}", level_number),
            grade_tags: grade_tags.to_vec(),
            allowed_operations: allowed_operations.to_vec(),
            required_correct_answers: DEFAULT_REQUIRED_CORRECT,
            time_limit_seconds: standard_time_limit(level_number),
        }
    }

    /// Builder: set the required-correct goal
    pub fn with_required_correct(mut self, required: u32) -> Self {
        self.required_correct_answers = required;
        self
    }

    /// Builder: set the time limit
    pub fn with_time_limit(mut self, seconds: u64) -> Self {
        self.time_limit_seconds = seconds;
        self
    }

    pub fn time_limit_ms(&self) -> i64 {
        i64::try_from(self.time_limit_seconds)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000)
    }

    /// Check the definition can drive a session
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.grade_tags.is_empty() {
            return Err(CatalogError::Validation(format!(
                "Level {} has no grade tags",
                self.level_number
            )));
        }
        if self.allowed_operations.is_empty() {
            return Err(CatalogError::Validation(format!(
                "Level {} has no allowed operations",
                self.level_number
            )));
        }
        if self.required_correct_answers == 0 {
            return Err(CatalogError::Validation(format!(
                "Level {} requires zero correct answers",
                self.level_number
            )));
        }
        Ok(())
    }
}

/// Time limit for a standard level: 90 s plus 60 s per completed pair of levels
pub fn standard_time_limit(level_number: u32) -> u64 {
    let pair_index = level_number.saturating_sub(1) / 2;
    DEFAULT_TIME_LIMIT_SECS + pair_index as u64 * TIME_INCREMENT_EVERY_TWO_LEVELS_SECS
}

/// Ordered collection of levels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCatalog {
    levels: Vec<LevelDefinition>,
}

impl LevelCatalog {
    /// Build a validated catalog
    pub fn new(levels: Vec<LevelDefinition>) -> Result<Self, CatalogError> {
        let catalog = Self { levels };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The ten built-in levels
    pub fn standard() -> Self {
        use GradeTag::*;
        use Operation::*;

        const ADD: &[Operation] = &[Addition];
        const ADD_SUB: &[Operation] = &[Addition, Subtraction];
        const ALL: &[Operation] = &[Addition, Subtraction, Multiplication];

        Self {
            levels: vec![
                LevelDefinition::new(1, &[Grade1], ADD),
                LevelDefinition::new(2, &[Grade1, Grade2], ADD_SUB),
                LevelDefinition::new(3, &[Grade2], ADD_SUB),
                LevelDefinition::new(4, &[Grade2, Grade3], ALL),
                LevelDefinition::new(5, &[Grade3], ALL),
                LevelDefinition::new(6, &[Grade3, Grade4], ALL),
                LevelDefinition::new(7, &[Grade4], ALL),
                LevelDefinition::new(8, &[Grade4, Grade5], ALL),
                LevelDefinition::new(9, &[Grade5], ALL),
                LevelDefinition::new(10, &[Grade5, Grade6], ALL),
            ],
        }
    }

    /// Parse a catalog from JSON (`{"levels": [...]}`)
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a catalog from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_yml::from_str(yaml)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let catalog = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content)?,
            Some("yaml") | Some("yml") => Self::from_yaml(&content)?,
            other => {
                return Err(CatalogError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                ));
            }
        };
        log::info!("[Catalog] Loaded {} levels from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// Export as pretty JSON
    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate every level and the uniqueness of level numbers
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.levels.is_empty() {
            return Err(CatalogError::Validation("Catalog has no levels".into()));
        }
        let mut numbers = HashSet::with_capacity(self.levels.len());
        for level in &self.levels {
            level.validate()?;
            if !numbers.insert(level.level_number) {
                return Err(CatalogError::Validation(format!(
                    "Duplicate level number {}",
                    level.level_number
                )));
            }
        }
        Ok(())
    }

    /// Look up a level by number
    pub fn get(&self, level_number: u32) -> Result<&LevelDefinition, CatalogError> {
        self.levels
            .iter()
            .find(|l| l.level_number == level_number)
            .ok_or(CatalogError::LevelNotFound(level_number))
    }

    pub fn levels(&self) -> &[LevelDefinition] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog() {
        let catalog = LevelCatalog::standard();
        assert_eq!(catalog.len(), 10);
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_alternating_grades() {
        let catalog = LevelCatalog::standard();
        assert_eq!(catalog.get(1).unwrap().grade_tags, vec![GradeTag::Grade1]);
        assert_eq!(
            catalog.get(2).unwrap().grade_tags,
            vec![GradeTag::Grade1, GradeTag::Grade2]
        );
        assert_eq!(catalog.get(3).unwrap().grade_tags, vec![GradeTag::Grade2]);
        assert_eq!(
            catalog.get(4).unwrap().grade_tags,
            vec![GradeTag::Grade2, GradeTag::Grade3]
        );
        assert_eq!(catalog.get(5).unwrap().grade_tags, vec![GradeTag::Grade3]);
        assert_eq!(
            catalog.get(10).unwrap().grade_tags,
            vec![GradeTag::Grade5, GradeTag::Grade6]
        );
    }

    #[test]
    fn test_time_limits() {
        assert_eq!(standard_time_limit(1), 90);
        assert_eq!(standard_time_limit(2), 90);
        assert_eq!(standard_time_limit(3), 150);
        assert_eq!(standard_time_limit(10), 330);

        let level = LevelCatalog::standard().get(7).unwrap().clone();
        assert_eq!(level.id, "level-7");
        assert_eq!(level.title, "Level 7");
        assert_eq!(level.time_limit_seconds, 270);
        assert_eq!(level.required_correct_answers, 10);

        let endless = level.with_time_limit(u64::MAX);
        assert_eq!(endless.time_limit_ms(), i64::MAX);
    }

    #[test]
    fn test_missing_level() {
        let catalog = LevelCatalog::standard();
        assert!(matches!(catalog.get(11), Err(CatalogError::LevelNotFound(11))));
    }

    #[test]
    fn test_validation_rejects_empty_pools() {
        let level = LevelDefinition::new(1, &[], &[Operation::Addition]);
        assert!(level.validate().is_err());

        let level = LevelDefinition::new(1, &[GradeTag::Grade1], &[]);
        assert!(level.validate().is_err());

        let level =
            LevelDefinition::new(1, &[GradeTag::Grade1], &[Operation::Addition]).with_required_correct(0);
        assert!(level.validate().is_err());

        let dup = vec![
            LevelDefinition::new(1, &[GradeTag::Grade1], &[Operation::Addition]),
            LevelDefinition::new(1, &[GradeTag::Grade2], &[Operation::Addition]),
        ];
        assert!(LevelCatalog::new(dup).is_err());
    }

    #[test]
    fn test_json_round_trip_tokens() {
        let json = r#"{
            "levels": [{
                "id": "custom-1",
                "levelNumber": 1,
                "title": "Warm-up",
                "gradeTags": ["grade1"],
                "allowedOperations": ["addition", "subtraction"],
                "requiredCorrectAnswers": 3,
                "timeLimitSeconds": 45
            }]
        }"#;

        let catalog = LevelCatalog::from_json(json).unwrap();
        let level = catalog.get(1).unwrap();
        assert_eq!(level.title, "Warm-up");
        assert_eq!(level.required_correct_answers, 3);
        assert_eq!(level.time_limit_ms(), 45_000);
        assert_eq!(
            level.allowed_operations,
            vec![Operation::Addition, Operation::Subtraction]
        );
    }

    #[test]
    fn test_json_rejects_unknown_operation() {
        let json = r#"{
            "levels": [{
                "id": "bad",
                "levelNumber": 1,
                "title": "Bad",
                "gradeTags": ["grade1"],
                "allowedOperations": ["division"],
                "requiredCorrectAnswers": 3,
                "timeLimitSeconds": 45
            }]
        }"#;
        assert!(matches!(LevelCatalog::from_json(json), Err(CatalogError::Json(_))));
    }

    #[test]
    fn test_yaml_catalog() {
        let yaml = r#"
levels:
  - id: level-1
    levelNumber: 1
    title: Level 1
    gradeTags: [grade2, grade3]
    allowedOperations: [multiplication]
    requiredCorrectAnswers: 5
    timeLimitSeconds: 60
"#;
        let catalog = LevelCatalog::from_yaml(yaml).unwrap();
        let level = catalog.get(1).unwrap();
        assert_eq!(level.grade_tags, vec![GradeTag::Grade2, GradeTag::Grade3]);
        assert_eq!(level.allowed_operations, vec![Operation::Multiplication]);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("levels.json");
        std::fs::write(&json_path, LevelCatalog::standard().to_json().unwrap()).unwrap();
        let loaded = LevelCatalog::load(&json_path).unwrap();
        assert_eq!(loaded, LevelCatalog::standard());

        let txt_path = dir.path().join("levels.txt");
        std::fs::write(&txt_path, "levels: []").unwrap();
        assert!(matches!(
            LevelCatalog::load(&txt_path),
            Err(CatalogError::UnsupportedFormat(ext)) if ext == "txt"
        ));

        assert!(matches!(
            LevelCatalog::load(dir.path().join("missing.yaml")),
            Err(CatalogError::Io(_))
        ));
    }
}
