//! Per-language views over classes with mixed language students.
//!
//! A class whose students take the exam in different languages is split into
//! one virtual class per language so each group can be selected on its own.
//! Selections made over virtual classes are folded back into real class ids
//! plus an optional per-class language filter.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::aggregate::locale_cmp;

/// Label used for the virtual class of students without a language.
pub const NO_LANGUAGE_LABEL: &str = "No Language Specified";

/// Id suffix of the virtual class of students without a language.
const NO_LANGUAGE_SUFFIX: &str = "no_lang";

/// Shift of a class, stored either as a number or as a label such as `"II"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Shift {
    Number(i64),
    Label(String),
}

impl Shift {
    /// Printable shift, with shifts 1 and 2 shown as roman numerals.
    pub fn label(&self) -> String {
        match self {
            Self::Number(1) => "I".to_owned(),
            Self::Number(2) => "II".to_owned(),
            Self::Number(n) => n.to_string(),
            Self::Label(label) => label.clone(),
        }
    }

    fn is_set(&self) -> bool {
        match self {
            Self::Number(n) => *n != 0,
            Self::Label(label) => !label.is_empty(),
        }
    }
}

/// A student as listed in a class record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassStudent {
    pub roll_number: String,
    pub student_name: String,
    pub language: Option<String>,
}

impl ClassStudent {
    pub fn new(roll_number: impl Into<String>, student_name: impl Into<String>) -> Self {
        Self {
            roll_number: roll_number.into(),
            student_name: student_name.into(),
            language: None,
        }
    }

    /// Sets the exam language and returns the updated student.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// The trimmed language, or `None` when absent or blank.
    pub fn language(&self) -> Option<&str> {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|language| !language.is_empty())
    }
}

/// A class record with its students.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: i64,
    pub class_name: String,
    #[serde(default)]
    pub shift: Option<Shift>,
    #[serde(default)]
    pub students: Vec<ClassStudent>,
}

impl Class {
    pub fn new(id: i64, class_name: impl Into<String>) -> Self {
        Self {
            id,
            class_name: class_name.into(),
            shift: None,
            students: Vec::new(),
        }
    }

    pub fn with_shift(mut self, shift: Shift) -> Self {
        self.shift = Some(shift);
        self
    }

    pub fn with_students<I>(mut self, students: I) -> Self
    where
        I: IntoIterator<Item = ClassStudent>,
    {
        self.students.extend(students);
        self
    }

    fn shift_label(&self) -> Option<String> {
        self.shift.as_ref().filter(|shift| shift.is_set()).map(Shift::label)
    }
}

/// `"{name} - Shift {shift}"`, or just the name for classes without a shift.
pub fn class_display_name(class: &Class) -> String {
    match class.shift_label() {
        Some(shift) => format!("{} - Shift {shift}", class.class_name),
        None => class.class_name.clone(),
    }
}

/// Compact `"{name} ({shift})"` form of [`class_display_name`].
pub fn class_short_name(class: &Class) -> String {
    match class.shift_label() {
        Some(shift) => format!("{} ({shift})", class.class_name),
        None => class.class_name.clone(),
    }
}

/// Distinct languages of a class, sorted.
///
/// Languages that differ only in case count once; the spelling that sorts
/// first is kept.
pub fn class_languages(class: &Class) -> Vec<String> {
    let mut languages: Vec<&str> = class.students.iter().filter_map(ClassStudent::language).collect();
    languages.sort_unstable();

    let mut seen = BTreeSet::new();
    languages
        .into_iter()
        .filter(|language| seen.insert(language.to_lowercase()))
        .map(str::to_owned)
        .collect()
}

/// Number of students per trimmed language.
pub fn language_distribution(class: &Class) -> BTreeMap<String, usize> {
    let mut distribution = BTreeMap::new();
    for language in class.students.iter().filter_map(ClassStudent::language) {
        *distribution.entry(language.to_owned()).or_insert(0) += 1;
    }
    distribution
}

/// One line description of the language mix of a class.
pub fn describe_languages(class: &Class) -> String {
    let distribution = language_distribution(class);
    match distribution.len() {
        0 => "No language specified".to_owned(),
        1 => {
            let (language, count) = distribution.iter().next().map_or(("", 0), |(l, c)| (l.as_str(), *c));
            format!("{language} ({count} students)")
        }
        _ => {
            let parts: Vec<String> = distribution
                .iter()
                .map(|(language, count)| format!("{language} ({count})"))
                .collect();
            format!("Mixed: {}", parts.join(", "))
        }
    }
}

/// A selectable slice of a class: the students sharing one language.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualClass {
    /// `"{class id}_{language}"` or `"{class id}_no_lang"`.
    pub id: String,
    pub original_id: i64,
    pub class_name: String,
    pub shift: Option<Shift>,
    pub display_name: String,
    /// `None` for the group of students without a language.
    pub language: Option<String>,
    pub language_label: String,
    pub students: Vec<ClassStudent>,
}

fn virtual_id(class_id: i64, language: Option<&str>) -> String {
    match language {
        Some(language) => {
            let slug = language
                .to_lowercase()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("_");
            format!("{class_id}_{slug}")
        }
        None => format!("{class_id}_{NO_LANGUAGE_SUFFIX}"),
    }
}

fn matches_language(student: &ClassStudent, language: &str) -> bool {
    student
        .language()
        .map_or(false, |own| own.to_lowercase() == language.to_lowercase())
}

fn expand_class(class: &Class, out: &mut Vec<VirtualClass>) {
    let languages = class_languages(class);
    let display = class_display_name(class);
    let virtual_class = |language: Option<&str>, display_name: String, students: Vec<ClassStudent>| VirtualClass {
        id: virtual_id(class.id, language),
        original_id: class.id,
        class_name: class.class_name.clone(),
        shift: class.shift.clone(),
        display_name,
        language: language.map(str::to_owned),
        language_label: language.unwrap_or(NO_LANGUAGE_LABEL).to_owned(),
        students,
    };

    let unlabelled: Vec<ClassStudent> = class
        .students
        .iter()
        .filter(|student| student.language().is_none())
        .cloned()
        .collect();

    if languages.is_empty() {
        out.push(virtual_class(None, display, unlabelled));
        return;
    }

    for language in &languages {
        let students: Vec<ClassStudent> = class
            .students
            .iter()
            .filter(|student| matches_language(student, language))
            .cloned()
            .collect();
        out.push(virtual_class(
            Some(language.as_str()),
            format!("{display} - {language}"),
            students,
        ));
    }

    if !unlabelled.is_empty() {
        out.push(virtual_class(
            None,
            format!("{display} - {NO_LANGUAGE_LABEL}"),
            unlabelled,
        ));
    }
}

fn compare_virtual(a: &VirtualClass, b: &VirtualClass) -> Ordering {
    let shift = |class: &VirtualClass| class.shift.as_ref().map(Shift::label).unwrap_or_default();
    locale_cmp(&a.class_name, &b.class_name)
        .then_with(|| locale_cmp(&shift(a), &shift(b)))
        .then_with(|| match (&a.language, &b.language) {
            (Some(a), Some(b)) => locale_cmp(a, b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Splits every class into one virtual class per language.
///
/// Students without a language form an extra group; a class without any
/// language information yields exactly one such group holding all students.
/// The result is ordered by class name, shift and language, with the
/// no-language group of a class last.
pub fn expand_by_language(classes: &[Class]) -> Vec<VirtualClass> {
    let mut expanded = Vec::new();
    for class in classes {
        expand_class(class, &mut expanded);
    }
    expanded.sort_by(compare_virtual);
    expanded
}

/// Real classes picked through virtual class selections.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub class_ids: BTreeSet<i64>,
    /// Languages to keep per class. Classes picked only through their
    /// no-language group are absent and include all their students.
    pub language_filter: BTreeMap<i64, BTreeSet<String>>,
}

/// Folds selected virtual class ids back into real class ids.
///
/// Ids that match no virtual class are ignored.
pub fn reconcile_selections<S: AsRef<str>>(selected: &[S], virtual_classes: &[VirtualClass]) -> Selection {
    let mut selection = Selection::default();

    for id in selected {
        let Some(entry) = virtual_classes.iter().find(|class| class.id == id.as_ref()) else {
            continue;
        };
        selection.class_ids.insert(entry.original_id);
        if let Some(language) = &entry.language {
            selection
                .language_filter
                .entry(entry.original_id)
                .or_default()
                .insert(language.clone());
        }
    }

    selection
}

/// One selected virtual class in a [`SelectionSummary`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionDetail {
    pub class_name: String,
    pub shift: Option<String>,
    pub language: Option<String>,
    pub student_count: usize,
    pub display_name: String,
}

/// Totals over a set of selected virtual classes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSummary {
    pub total_students: usize,
    pub total_languages: usize,
    pub total_classes: usize,
    pub total_selections: usize,
    pub languages: Vec<String>,
    pub details: Vec<SelectionDetail>,
}

pub fn selection_summary<S: AsRef<str>>(selected: &[S], virtual_classes: &[VirtualClass]) -> SelectionSummary {
    let mut languages = BTreeSet::new();
    let mut classes = BTreeSet::new();
    let mut summary = SelectionSummary {
        total_selections: selected.len(),
        ..SelectionSummary::default()
    };

    for id in selected {
        let Some(entry) = virtual_classes.iter().find(|class| class.id == id.as_ref()) else {
            continue;
        };
        summary.total_students += entry.students.len();
        classes.insert(entry.original_id);
        if let Some(language) = &entry.language {
            languages.insert(language.clone());
        }
        summary.details.push(SelectionDetail {
            class_name: entry.class_name.clone(),
            shift: entry.shift.as_ref().map(Shift::label),
            language: entry.language.clone(),
            student_count: entry.students.len(),
            display_name: entry.display_name.clone(),
        });
    }

    summary.total_languages = languages.len();
    summary.total_classes = classes.len();
    summary.languages = languages.into_iter().collect();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(roll: &str, language: Option<&str>) -> ClassStudent {
        let student = ClassStudent::new(roll, format!("Student {roll}"));
        match language {
            Some(language) => student.with_language(language),
            None => student,
        }
    }

    fn hindi_class() -> Class {
        Class::new(7, "I BBA").with_shift(Shift::Number(1)).with_students([
            student("1", Some("HINDI")),
            student("2", Some("HINDI")),
            student("3", None),
        ])
    }

    #[test]
    fn mixed_class_splits_into_language_and_no_language_groups() {
        let expanded = expand_by_language(&[hindi_class()]);
        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[0].language.as_deref(), Some("HINDI"));
        assert_eq!(expanded[0].students.len(), 2);
        assert_eq!(expanded[0].id, "7_hindi");
        assert_eq!(expanded[0].display_name, "I BBA - Shift I - HINDI");
        assert_eq!(expanded[1].language, None);
        assert_eq!(expanded[1].students.len(), 1);
        assert_eq!(expanded[1].id, "7_no_lang");
        assert_eq!(expanded[1].language_label, NO_LANGUAGE_LABEL);
    }

    #[test]
    fn single_language_class_is_not_duplicated() {
        let class = Class::new(3, "II BCOM").with_students([
            student("1", Some("Tamil")),
            student("2", Some(" tamil ")),
        ]);
        let expanded = expand_by_language(&[class]);
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].students.len(), 2);
        assert_eq!(expanded[0].id, "3_tamil");
    }

    #[test]
    fn class_without_languages_yields_one_entry() {
        let class = Class::new(4, "III BSC").with_students([student("1", None), student("2", Some("  "))]);
        let expanded = expand_by_language(&[class]);
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].students.len(), 2);
        assert_eq!(expanded[0].display_name, "III BSC");
    }

    #[test]
    fn language_ids_replace_whitespace() {
        assert_eq!(virtual_id(9, Some("Old  Church Slavonic")), "9_old_church_slavonic");
        assert_eq!(virtual_id(9, None), "9_no_lang");
    }

    #[test]
    fn expansion_is_sorted_with_no_language_last() {
        let classes = [
            Class::new(2, "b class").with_students([student("1", None), student("2", Some("Urdu"))]),
            Class::new(1, "A class").with_students([student("3", Some("Tamil")), student("4", Some("Hindi"))]),
        ];
        let ids: Vec<String> = expand_by_language(&classes).into_iter().map(|class| class.id).collect();
        assert_eq!(ids, ["1_hindi", "1_tamil", "2_urdu", "2_no_lang"]);
    }

    #[test]
    fn no_language_only_selection_skips_language_filter() {
        let expanded = expand_by_language(&[hindi_class()]);
        let selection = reconcile_selections(&["7_no_lang"], &expanded);
        assert!(selection.class_ids.contains(&7));
        assert!(selection.language_filter.is_empty());
    }

    #[test]
    fn language_selection_is_grouped_per_class() {
        let expanded = expand_by_language(&[hindi_class()]);
        let selection = reconcile_selections(&["7_hindi", "7_no_lang", "missing"], &expanded);
        assert_eq!(selection.class_ids.len(), 1);
        let languages: Vec<&String> = selection.language_filter[&7].iter().collect();
        assert_eq!(languages, ["HINDI"]);
    }

    #[test]
    fn display_names_format_shifts() {
        let class = Class::new(1, "I BBA").with_shift(Shift::Number(2));
        assert_eq!(class_display_name(&class), "I BBA - Shift II");
        assert_eq!(class_short_name(&class), "I BBA (II)");
        let class = Class::new(1, "I BBA").with_shift(Shift::Label("III".to_owned()));
        assert_eq!(class_short_name(&class), "I BBA (III)");
        assert_eq!(class_display_name(&Class::new(1, "I BBA")), "I BBA");
    }

    #[test]
    fn language_info_counts_students() {
        let class = hindi_class();
        assert_eq!(class_languages(&class), ["HINDI"]);
        assert_eq!(language_distribution(&class)["HINDI"], 2);
        assert_eq!(describe_languages(&class), "HINDI (2 students)");
    }

    #[test]
    fn selection_summary_totals() {
        let expanded = expand_by_language(&[hindi_class()]);
        let summary = selection_summary(&["7_hindi", "7_no_lang"], &expanded);
        assert_eq!(summary.total_students, 3);
        assert_eq!(summary.total_languages, 1);
        assert_eq!(summary.total_classes, 1);
        assert_eq!(summary.total_selections, 2);
        assert_eq!(summary.details[0].shift.as_deref(), Some("I"));
    }

    #[test]
    fn classes_deserialize_from_json() {
        let classes: Vec<Class> = serde_json::from_str(
            r#"[{"id": 1, "className": "I BBA", "shift": "II",
                 "students": [{"rollNumber": "1", "studentName": "Asha", "language": "Hindi"}]}]"#,
        )
        .unwrap();
        assert_eq!(classes[0].shift, Some(Shift::Label("II".to_owned())));
        assert_eq!(classes[0].students[0].language(), Some("Hindi"));
    }
}
