//! Core data model types for gradestat.
//!
//! These are the types every stage shares: the fixed subject set, per-subject
//! maps, the maximum-score configuration, class labels, and the cleaned score
//! table produced by the loader.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Number of subjects in a score sheet.
pub const SUBJECT_COUNT: usize = 5;

/// Maximum score assumed for a subject when none is configured.
pub const DEFAULT_MAX_SCORE: f64 = 100.0;

/// The five examined subjects, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Chinese,
    Math,
    English,
    Science,
    /// Morality and law.
    Politics,
}

impl Subject {
    /// All subjects in report order.
    pub const ALL: [Subject; SUBJECT_COUNT] = [
        Subject::Chinese,
        Subject::Math,
        Subject::English,
        Subject::Science,
        Subject::Politics,
    ];

    /// Stable lowercase key used in config files and form fields.
    pub fn key(self) -> &'static str {
        match self {
            Subject::Chinese => "chinese",
            Subject::Math => "math",
            Subject::English => "english",
            Subject::Science => "science",
            Subject::Politics => "politics",
        }
    }

    /// Display label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Subject::Chinese => "Chinese",
            Subject::Math => "Math",
            Subject::English => "English",
            Subject::Science => "Science",
            Subject::Politics => "Politics",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chinese" => Ok(Subject::Chinese),
            "math" | "maths" | "mathematics" => Ok(Subject::Math),
            "english" => Ok(Subject::English),
            "science" => Ok(Subject::Science),
            "politics" | "morality" => Ok(Subject::Politics),
            other => Err(format!("unknown subject: {other}")),
        }
    }
}

/// A value for each subject, always complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectMap<T>([T; SUBJECT_COUNT]);

impl<T> SubjectMap<T> {
    /// Build a map by evaluating `f` for every subject in report order.
    pub fn from_fn(f: impl FnMut(Subject) -> T) -> Self {
        Self(Subject::ALL.map(f))
    }

    pub fn get(&self, subject: Subject) -> &T {
        &self.0[subject.index()]
    }

    /// Iterate `(subject, value)` pairs in report order.
    pub fn iter(&self) -> impl Iterator<Item = (Subject, &T)> {
        Subject::ALL.into_iter().zip(self.0.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    pub fn map<U>(&self, mut f: impl FnMut(Subject, &T) -> U) -> SubjectMap<U> {
        SubjectMap::from_fn(|s| f(s, self.get(s)))
    }
}

impl<T: Clone> SubjectMap<T> {
    pub fn splat(value: T) -> Self {
        Self::from_fn(|_| value.clone())
    }
}

impl<T: Default> Default for SubjectMap<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<Subject> for SubjectMap<T> {
    type Output = T;

    fn index(&self, subject: Subject) -> &T {
        &self.0[subject.index()]
    }
}

impl<T> IndexMut<Subject> for SubjectMap<T> {
    fn index_mut(&mut self, subject: Subject) -> &mut T {
        &mut self.0[subject.index()]
    }
}

impl<T: Serialize> Serialize for SubjectMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SUBJECT_COUNT))?;
        for (subject, value) in self.iter() {
            map.serialize_entry(subject.key(), value)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for SubjectMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MapVisitor<T>(std::marker::PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for MapVisitor<T> {
            type Value = SubjectMap<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map with one entry per subject")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut slots: [Option<T>; SUBJECT_COUNT] = Default::default();
                while let Some(key) = access.next_key::<String>()? {
                    let subject: Subject = key.parse().map_err(de::Error::custom)?;
                    slots[subject.index()] = Some(access.next_value()?);
                }
                let absent: Vec<&str> = Subject::ALL
                    .iter()
                    .zip(slots.iter())
                    .filter(|(_, v)| v.is_none())
                    .map(|(s, _)| s.key())
                    .collect();
                if !absent.is_empty() {
                    return Err(de::Error::custom(format!(
                        "missing subjects: {}",
                        absent.join(", ")
                    )));
                }
                let values: Vec<T> = slots.into_iter().flatten().collect();
                let values: [T; SUBJECT_COUNT] = values
                    .try_into()
                    .map_err(|_| de::Error::custom("wrong number of subjects"))?;
                Ok(SubjectMap(values))
            }
        }

        deserializer.deserialize_map(MapVisitor(std::marker::PhantomData))
    }
}

/// Maximum score per subject. Every value is finite and greater than zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectConfig {
    max_scores: SubjectMap<f64>,
}

impl Default for SubjectConfig {
    fn default() -> Self {
        Self {
            max_scores: SubjectMap::splat(DEFAULT_MAX_SCORE),
        }
    }
}

impl SubjectConfig {
    pub fn new(max_scores: SubjectMap<f64>) -> Result<Self, ValidationError> {
        let config = Self { max_scores };
        config.validate()?;
        Ok(config)
    }

    /// Build a config from optional textual values (HTTP form fields, CLI
    /// strings). Absent or blank fields fall back to [`DEFAULT_MAX_SCORE`].
    pub fn from_text_fields<'a, I>(fields: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (Subject, Option<&'a str>)>,
    {
        let mut max_scores = SubjectMap::splat(DEFAULT_MAX_SCORE);
        for (subject, raw) in fields {
            let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
                continue;
            };
            let value: f64 = raw.parse().map_err(|_| ValidationError::InvalidMaxScore {
                subject,
                raw: raw.to_string(),
            })?;
            max_scores[subject] = value;
        }
        Self::new(max_scores)
    }

    /// Replace one subject's maximum score.
    pub fn with_max_score(mut self, subject: Subject, value: f64) -> Result<Self, ValidationError> {
        self.max_scores[subject] = value;
        self.validate()?;
        Ok(self)
    }

    /// Check the positivity invariant. Deserialized configs bypass [`new`],
    /// so the engine calls this before every analysis.
    ///
    /// [`new`]: SubjectConfig::new
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (subject, &value) in self.max_scores.iter() {
            if !value.is_finite() || value <= 0.0 {
                return Err(ValidationError::NonPositiveMaxScore { subject, value });
            }
        }
        Ok(())
    }

    pub fn max_score(&self, subject: Subject) -> f64 {
        self.max_scores[subject]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Subject, f64)> + '_ {
        self.max_scores.iter().map(|(s, &v)| (s, v))
    }
}

/// A class label: trimmed and never empty.
///
/// Labels order naturally: two numeric labels compare by value, numeric
/// labels sort before textual ones, and textual labels compare lexically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClassId(String);

impl ClassId {
    /// Returns `None` for blank labels.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl Ord for ClassId {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_kind = match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_kind.then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for ClassId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ClassId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ClassId::new(&value).ok_or_else(|| "class label must not be empty".to_string())
    }
}

impl From<ClassId> for String {
    fn from(id: ClassId) -> Self {
        id.0
    }
}

/// One student's row after cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    /// Class label; `None` when the cell was blank.
    pub class: Option<ClassId>,
    /// Cleaned subject scores (unparseable values already replaced by 0).
    pub scores: SubjectMap<f64>,
}

impl StudentRecord {
    pub fn new(class: Option<ClassId>, scores: SubjectMap<f64>) -> Self {
        Self { class, scores }
    }

    /// Sum of the five subject scores.
    pub fn total(&self) -> f64 {
        self.scores.values().sum()
    }
}

/// The cleaned input of one analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreTable {
    students: Vec<StudentRecord>,
}

impl ScoreTable {
    pub fn new(students: Vec<StudentRecord>) -> Self {
        Self { students }
    }

    pub fn students(&self) -> &[StudentRecord] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Number of distinct class labels.
    pub fn class_count(&self) -> usize {
        self.students
            .iter()
            .filter_map(|s| s.class.as_ref())
            .collect::<std::collections::BTreeSet<_>>()
            .len()
    }

    /// Rows whose class label is blank; these count toward the grade only.
    pub fn unlabeled_count(&self) -> usize {
        self.students.iter().filter(|s| s.class.is_none()).count()
    }
}

impl FromIterator<StudentRecord> for ScoreTable {
    fn from_iter<I: IntoIterator<Item = StudentRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
