//! Concept taxonomy: concept name -> representative terms, plus the ordered
//! trigger rules that map a checklist item onto exactly one concept.

use std::collections::BTreeMap;

/// A named cluster of related requirement topics
#[derive(Debug, Clone, PartialEq)]
pub struct Concept {
    /// Terms scored against the document, most specific first
    pub terms: Vec<String>,
    /// Words that identify the topic in free-form context ("no final exam")
    pub topics: Vec<String>,
}

/// All `required` substrings must occur in the lowercased item text
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerRule {
    pub required: Vec<String>,
    pub concept: String,
}

impl TriggerRule {
    pub fn matches(&self, lowered: &str) -> bool {
        self.required.iter().all(|needle| lowered.contains(needle.as_str()))
    }
}

const INSTRUCTOR_EMAIL: &[&str] = &[
    "instructor",
    "email",
    "contact",
    "professor",
    "faculty",
    "lecturer",
    "teacher",
    "ucalgary.ca",
    "@ucalgary",
    "reach me",
    "contacting",
    "get in touch",
    "reach out",
];

const COURSE_OBJECTIVES: &[&str] = &[
    "objectives",
    "outcomes",
    "goals",
    "learning outcomes",
    "course goals",
    "upon completion",
    "students will",
    "able to",
    "learn to",
    "course aims",
    "intended outcomes",
    "learning goals",
    "purpose",
    "by the end of this course",
];

const TEXTBOOKS: &[&str] = &[
    "textbook",
    "readings",
    "materials",
    "required text",
    "course material",
    "books",
    "reading list",
    "bibliography",
    "required reading",
    "suggested reading",
    "recommended text",
    "course pack",
    "resources",
    "literature",
];

const PROHIBITED_MATERIALS: &[&str] = &[
    "prohibited",
    "not allowed",
    "restricted",
    "forbidden",
    "not permitted",
    "banned",
    "disallowed",
    "chatgpt",
    "generative ai",
    "ai tools",
    "academic integrity",
    "cheating",
    "plagiarism",
];

const COURSE_WORKLOAD: &[&str] = &[
    "workload",
    "time commitment",
    "hours per week",
    "expected effort",
    "time required",
    "work expected",
    "weekly time",
    "commitment",
    "hours of work",
];

const GRADING_SCALE: &[&str] = &[
    "grading scale",
    "grade scale",
    "letter grade",
    "grade conversion",
    "percentage",
    "a+",
    "a-",
    "b+",
    "letter grades",
    "grade points",
    "grade point average",
    "gpa",
    "grading system",
];

const GRADE_DISTRIBUTION: &[&str] = &[
    "grade distribution",
    "assignment weights",
    "assessment weight",
    "component",
    "percent",
    "weight",
    "worth",
    "marking scheme",
    "evaluation",
    "assessment",
    "graded",
];

const GROUP_WORK: &[&str] = &[
    "group work",
    "group project",
    "team",
    "collaborative",
    "group assignment",
    "peers",
    "partner",
    "teamwork",
    "group portion",
    "group contribution",
    "team assignment",
    "group members",
    "team members",
];

const ASSESSMENT_OBJECTIVES: &[&str] = &[
    "assessment",
    "objective",
    "learning outcome",
    "measure",
    "align",
    "alignment",
    "mapped to",
    "correspond",
    "linked to",
    "demonstrates",
];

const DUE_DATES: &[&str] = &[
    "due date",
    "deadline",
    "due on",
    "submit by",
    "submission date",
    "calendar",
    "schedule",
    "timeline",
    "due",
    "date",
    "week",
    "cutoff",
];

const EARLY_ASSESSMENT: &[&str] = &[
    "30%",
    "thirty percent",
    "early feedback",
    "before last class",
    "prior to end",
    "before final",
    "before end of term",
    "mid-term",
    "first half",
    "early in the course",
    "early assessment",
];

const POST_TERM_ASSIGNMENTS: &[&str] = &[
    "after last class",
    "after term ends",
    "after the end",
    "beyond last day",
    "past final class",
    "post-term",
    "after final lecture",
    "after course completion",
];

const MISSED_ASSESSMENT: &[&str] = &[
    "missed",
    "absence",
    "unable to attend",
    "cannot submit",
    "miss an",
    "deferral",
    "deferred",
    "make-up",
    "makeup",
    "accommodation",
    "exemption",
    "illness",
    "extenuating circumstances",
    "emergency",
    "excused",
    "extension",
];

const LATE_POLICY: &[&str] = &[
    "late",
    "overdue",
    "past deadline",
    "after due date",
    "tardy",
    "penalty",
    "deduction",
    "points off",
    "percent off",
    "reduction",
    "marked down",
    "late submission",
    "grace period",
    "extension",
    "acceptance of late",
];

const PARTICIPATION: &[&str] = &[
    "participation",
    "engagement",
    "contribution",
    "discussion",
    "attendance",
    "engage",
    "contribute",
    "involvement",
    "class participation",
    "seminar",
    "forum",
];

const ASSIGNMENT_SUBMISSION: &[&str] = &[
    "submission",
    "submit",
    "turn in",
    "hand in",
    "upload",
    "d2l",
    "dropbox",
    "online",
    "instructions",
    "how to submit",
    "where to submit",
    "submission format",
    "file format",
];

const GROUP_PROJECT: &[&str] = &[
    "group project",
    "team project",
    "team assignment",
    "collaborative project",
    "group work",
    "teamwork",
    "team formation",
    "group formation",
    "team members",
    "group members",
    "team roles",
    "group responsibilities",
    "peer evaluation",
];

const MIDTERM_QUIZ: &[&str] = &[
    "midterm",
    "mid-term",
    "quiz",
    "test",
    "examination",
    "timing",
    "location",
    "format",
    "duration",
    "open book",
    "closed book",
    "permitted materials",
    "allowed resources",
];

const FINAL_EXAM: &[&str] = &[
    "final exam",
    "final test",
    "final assessment",
    "final",
    "examination",
    "end of term exam",
    "exam period",
    "registrar",
    "duration",
    "location",
    "modality",
    "format",
    "permitted materials",
];

const FINAL_EXAM_WEIGHT: &[&str] = &[
    "final exam",
    "weight",
    "percentage",
    "worth",
    "less than 50%",
    "maximum",
    "up to",
    "no more than",
    "portion",
    "component",
];

const TAKE_HOME_FINAL: &[&str] = &[
    "take home",
    "take-home",
    "at home",
    "remotely",
    "final project",
    "final assignment",
    "final paper",
    "culminating project",
    "end of term project",
];

const INSTRUCTOR_CONTACT: &[&str] = &[
    "contacting",
    "contact",
    "reach",
    "available",
    "availability",
    "office hours",
    "office location",
    "get in touch",
    "reach out",
    "email",
    "communication",
    "response time",
    "questions",
];

const CLASS_SCHEDULE: &[&str] = &[
    "schedule",
    "calendar",
    "timetable",
    "weekly",
    "topics",
    "sessions",
    "lectures",
    "class by class",
    "week by week",
    "timeline",
    "course progression",
    "dates",
];

const SCHEDULE_DUE_DATES: &[&str] = &[
    "schedule",
    "calendar",
    "timeline",
    "assignment",
    "due date",
    "deadline",
    "submission",
    "due",
    "dates",
    "week",
];

const SCHEDULE_EXAMS: &[&str] = &[
    "schedule",
    "calendar",
    "exam date",
    "test date",
    "quiz date",
    "assessment date",
    "midterm",
    "final exam",
    "final test",
    "examination period",
];

const LINKS: &[&str] = &[
    "link",
    "url",
    "website",
    "http",
    "https",
    "www",
    "webpage",
    "d2l",
    "desire2learn",
    "portal",
];

const FINAL_TOPICS: &[&str] = &["final exam", "final examination", "final"];
const GROUP_TOPICS: &[&str] = &["group", "team", "collaborative"];
const INSTRUCTOR_TOPICS: &[&str] = &["instructor", "professor", "email", "contact"];

/// (concept, terms, context topic words)
const BUILTIN_CONCEPTS: &[(&str, &[&str], &[&str])] = &[
    ("instructor_email", INSTRUCTOR_EMAIL, INSTRUCTOR_TOPICS),
    ("course_objectives", COURSE_OBJECTIVES, &["objective", "outcome"]),
    ("textbooks", TEXTBOOKS, &["textbook", "reading", "course material"]),
    ("prohibited_materials", PROHIBITED_MATERIALS, &["prohibited"]),
    ("course_workload", COURSE_WORKLOAD, &["workload"]),
    ("grading_scale", GRADING_SCALE, &["grading scale", "grade scale"]),
    ("grade_distribution", GRADE_DISTRIBUTION, &["grade distribution", "grade table"]),
    ("group_work", GROUP_WORK, GROUP_TOPICS),
    ("assessment_objectives", ASSESSMENT_OBJECTIVES, &["objective", "alignment"]),
    ("due_dates", DUE_DATES, &["due date", "deadline"]),
    ("early_assessment", EARLY_ASSESSMENT, &["30%", "last class"]),
    ("post_term_assignments", POST_TERM_ASSIGNMENTS, &["post-term", "after the last day"]),
    ("missed_assessment", MISSED_ASSESSMENT, &["missed assessment", "missed"]),
    ("late_policy", LATE_POLICY, &["late"]),
    ("participation", PARTICIPATION, &["participation", "engagement"]),
    ("assignment_submission", ASSIGNMENT_SUBMISSION, &["assignment", "submission"]),
    ("group_project", GROUP_PROJECT, GROUP_TOPICS),
    ("midterm_quiz", MIDTERM_QUIZ, &["midterm", "mid-term", "quiz", "test"]),
    ("final_exam", FINAL_EXAM, FINAL_TOPICS),
    ("final_exam_weight", FINAL_EXAM_WEIGHT, FINAL_TOPICS),
    ("take_home_final", TAKE_HOME_FINAL, &["take-home", "take home", "final"]),
    ("instructor_contact", INSTRUCTOR_CONTACT, INSTRUCTOR_TOPICS),
    ("class_schedule", CLASS_SCHEDULE, &["schedule", "timetable"]),
    ("schedule_due_dates", SCHEDULE_DUE_DATES, &["due date", "deadline"]),
    ("schedule_exams", SCHEDULE_EXAMS, &["exam date", "test date", "quiz date"]),
    ("links", LINKS, &["link", "url", "website"]),
];

/// Evaluated top to bottom; the first rule whose substrings all occur wins.
/// Specific pairs come before the single-phrase rules they overlap with.
const BUILTIN_TRIGGERS: &[(&[&str], &str)] = &[
    (&["email", "instructor"], "instructor_email"),
    (&["contact", "instructor"], "instructor_contact"),
    (&["class schedule", "due date"], "schedule_due_dates"),
    (&["class schedule", "exam"], "schedule_exams"),
    (&["class schedule"], "class_schedule"),
    (&["due date", "distribution table"], "due_dates"),
    (&["due date", "grade table"], "due_dates"),
    (&["grade distribution"], "grade_distribution"),
    (&["grade scale"], "grading_scale"),
    (&["grading scale"], "grading_scale"),
    (&["group", "40%"], "group_work"),
    (&["group project"], "group_project"),
    (&["30%", "before the last day"], "early_assessment"),
    (&["after the last day"], "post_term_assignments"),
    (&["missed assessment"], "missed_assessment"),
    (&["late policy"], "late_policy"),
    (&["late", "submission"], "late_policy"),
    (&["late", "penalt"], "late_policy"),
    (&["final exam", "50%"], "final_exam_weight"),
    (&["take-home"], "take_home_final"),
    (&["take home"], "take_home_final"),
    (&["final exam"], "final_exam"),
    (&["midterm"], "midterm_quiz"),
    (&["quiz"], "midterm_quiz"),
    (&["assessment", "objective"], "assessment_objectives"),
    (&["objective"], "course_objectives"),
    (&["textbook"], "textbooks"),
    (&["course material"], "textbooks"),
    (&["prohibited"], "prohibited_materials"),
    (&["workload"], "course_workload"),
    (&["participation"], "participation"),
    (&["assignment", "submit"], "assignment_submission"),
    (&["link"], "links"),
];

/// Immutable concept table handed to the interpreter and the scorer
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    concepts: BTreeMap<String, Concept>,
    triggers: Vec<TriggerRule>,
}

impl Taxonomy {
    /// An empty taxonomy; every item falls back to content-word keywords
    pub fn empty() -> Self {
        Self::default()
    }

    /// The course-outline taxonomy
    pub fn builtin() -> Self {
        let concepts = BUILTIN_CONCEPTS
            .iter()
            .map(|(name, terms, topics)| {
                (
                    name.to_string(),
                    Concept {
                        terms: to_owned(terms),
                        topics: to_owned(topics),
                    },
                )
            })
            .collect();
        let triggers = BUILTIN_TRIGGERS
            .iter()
            .map(|(required, concept)| TriggerRule {
                required: to_owned(required),
                concept: concept.to_string(),
            })
            .collect();
        Self { concepts, triggers }
    }

    /// Add or replace a concept
    pub fn with_concept(mut self, name: &str, terms: &[&str], topics: &[&str]) -> Self {
        self.concepts.insert(
            name.to_string(),
            Concept {
                terms: lowered(terms),
                topics: lowered(topics),
            },
        );
        self
    }

    /// Append a trigger rule at the lowest priority
    pub fn with_trigger(mut self, required: &[&str], concept: &str) -> Self {
        self.triggers.push(TriggerRule {
            required: lowered(required),
            concept: concept.to_string(),
        });
        self
    }

    pub fn concept(&self, name: &str) -> Option<&Concept> {
        self.concepts.get(name)
    }

    pub fn terms(&self, name: &str) -> Option<&[String]> {
        self.concepts.get(name).map(|c| c.terms.as_slice())
    }

    pub fn concept_names(&self) -> impl Iterator<Item = &str> {
        self.concepts.keys().map(String::as_str)
    }

    /// First trigger rule matching the item text, if its concept is known
    pub fn classify(&self, item_text: &str) -> Option<&str> {
        let lowered = item_text.to_lowercase();
        self.triggers
            .iter()
            .find(|rule| rule.matches(&lowered) && self.concepts.contains_key(&rule.concept))
            .map(|rule| rule.concept.as_str())
    }

    /// Whether a section title satisfies any trigger rule of `concept`
    pub fn title_signals(&self, concept: &str, title: &str) -> bool {
        let lowered = title.to_lowercase();
        self.triggers
            .iter()
            .filter(|rule| rule.concept == concept)
            .any(|rule| rule.matches(&lowered))
    }
}

fn to_owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn lowered(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::builtin_checklist;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_trigger_points_at_a_concept() {
        let taxonomy = Taxonomy::builtin();
        for (_, concept) in BUILTIN_TRIGGERS {
            assert!(
                taxonomy.concept(concept).is_some(),
                "trigger targets unknown concept {concept}"
            );
        }
    }

    #[test]
    fn test_builtin_terms_are_lowercase() {
        let taxonomy = Taxonomy::builtin();
        for name in taxonomy.concept_names() {
            for term in taxonomy.terms(name).unwrap() {
                assert_eq!(term, &term.to_lowercase());
            }
        }
    }

    #[test]
    fn test_classify_builtin_checklist() {
        let taxonomy = Taxonomy::builtin();
        let expected = [
            "instructor_email",
            "course_objectives",
            "textbooks",
            "prohibited_materials",
            "course_workload",
            "grading_scale",
            "grade_distribution",
            "group_work",
            "assessment_objectives",
            "due_dates",
            "early_assessment",
            "post_term_assignments",
            "missed_assessment",
            "late_policy",
            "participation",
            "assignment_submission",
            "group_project",
            "midterm_quiz",
            "final_exam",
            "final_exam_weight",
            "take_home_final",
            "instructor_contact",
            "class_schedule",
            "schedule_due_dates",
            "schedule_exams",
            "links",
        ];
        let got: Vec<&str> = builtin_checklist()
            .iter()
            .map(|item| taxonomy.classify(item).unwrap_or("<none>"))
            .collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let taxonomy = Taxonomy::builtin();
        // Mentions both a midterm and the final exam; the final exam rule sits higher
        assert_eq!(
            taxonomy.classify("Midterm and Final Exam timing"),
            Some("final_exam")
        );
        assert_eq!(taxonomy.classify("Weekly reflection journal"), None);
    }

    #[test]
    fn test_extension_adds_concept_and_trigger() {
        let taxonomy = Taxonomy::builtin()
            .with_concept("accessibility", &["Accommodation", "access"], &["access"])
            .with_trigger(&["accessibility"], "accessibility");
        assert_eq!(
            taxonomy.classify("Accessibility statement included?"),
            Some("accessibility")
        );
        assert_eq!(
            taxonomy.terms("accessibility").unwrap(),
            &["accommodation".to_string(), "access".to_string()]
        );
    }

    #[test]
    fn test_trigger_for_unknown_concept_is_ignored() {
        let taxonomy = Taxonomy::empty().with_trigger(&["late"], "late_policy");
        assert_eq!(taxonomy.classify("Late policy"), None);
    }

    #[test]
    fn test_title_signals() {
        let taxonomy = Taxonomy::builtin();
        assert!(taxonomy.title_signals("late_policy", "Late Policy"));
        assert!(taxonomy.title_signals("instructor_contact", "Contacting Your Instructor"));
        assert!(!taxonomy.title_signals("late_policy", "Course Description"));
    }
}
