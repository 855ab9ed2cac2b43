//! Built-in LifePulse resources: their field schemas and typed record structs.

use crate::schema::{Choice, FieldSchema, ResourceSchema, ValueEncoding};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A REST resource with a typed record whose fields match its schema.
pub trait Resource: DeserializeOwned + Serialize {
    const NAME: &'static str;

    fn schema() -> ResourceSchema;
}

/// Server-owned metadata shared by every entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryMeta {
    pub id: i64,
    pub recorded_at: Option<DateTime<Utc>>,
    pub local_date: Option<NaiveDate>,
    pub timezone: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthEntry {
    #[serde(flatten)]
    pub meta: EntryMeta,
    pub entry_type: Option<String>,
    pub sleep_hours: f64,
    pub energy_level: i64,
    pub supplements: Option<String>,
    pub weight_kg: Option<f64>,
    pub wellbeing: i64,
    pub steps: Option<i64>,
    pub notes: Option<String>,
}

impl Resource for HealthEntry {
    const NAME: &'static str = "health";

    fn schema() -> ResourceSchema {
        ResourceSchema::new(
            Self::NAME,
            "Health",
            vec![
                FieldSchema::single_choice(
                    "entry_type",
                    "Entry type",
                    vec![
                        Choice::new("day", "Day"),
                        Choice::new("morning", "Morning"),
                        Choice::new("evening", "Evening"),
                    ],
                )
                .optional(),
                FieldSchema::decimal("sleep_hours", "Sleep (hours)").min(0.0).max(24.0),
                FieldSchema::integer("energy_level", "Energy (1–10)").min(1.0).max(10.0),
                FieldSchema::text("supplements", "Supplements").optional(),
                FieldSchema::decimal("weight_kg", "Weight (kg)").min(0.0).max(500.0).optional(),
                FieldSchema::integer("wellbeing", "Wellbeing (1–10)").min(1.0).max(10.0),
                FieldSchema::integer("steps", "Steps").min(0.0).max(100000.0).optional(),
                FieldSchema::text("notes", "Notes").optional(),
            ],
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinanceEntry {
    #[serde(flatten)]
    pub meta: EntryMeta,
    pub income: f64,
    pub expense_food: f64,
    pub expense_transport: f64,
    pub expense_health: f64,
    pub expense_other: f64,
    pub notes: Option<String>,
}

impl Resource for FinanceEntry {
    const NAME: &'static str = "finance";

    fn schema() -> ResourceSchema {
        ResourceSchema::new(
            Self::NAME,
            "Finance",
            vec![
                FieldSchema::decimal("income", "Income").min(0.0),
                FieldSchema::decimal("expense_food", "Food").min(0.0),
                FieldSchema::decimal("expense_transport", "Transport").min(0.0),
                FieldSchema::decimal("expense_health", "Health").min(0.0),
                FieldSchema::decimal("expense_other", "Other").min(0.0),
                FieldSchema::text("notes", "Notes").optional(),
            ],
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductivityEntry {
    #[serde(flatten)]
    pub meta: EntryMeta,
    pub deep_work_hours: f64,
    pub tasks_completed: i64,
    pub focus_level: i64,
    pub focus_category: Option<String>,
    /// `None` when no task was ticked or the schema has no task picker.
    #[serde(default)]
    pub completed_task_ids: Option<Vec<i64>>,
    pub notes: Option<String>,
}

impl ProductivityEntry {
    /// Schema with a task picker; choices are the user's tasks as `(id, title)`.
    pub fn schema_with_tasks(tasks: &[(i64, String)]) -> ResourceSchema {
        let choices = tasks
            .iter()
            .map(|(id, title)| Choice::new(id.to_string(), title.clone()))
            .collect();
        Self::schema().with_field(
            FieldSchema::multi_choice("completed_task_ids", "Completed tasks", choices)
                .encoded_as(ValueEncoding::NumberArray)
                .optional(),
        )
    }
}

impl Resource for ProductivityEntry {
    const NAME: &'static str = "productivity";

    fn schema() -> ResourceSchema {
        ResourceSchema::new(
            Self::NAME,
            "Productivity",
            vec![
                FieldSchema::decimal("deep_work_hours", "Deep work (hours)").min(0.0).max(24.0),
                FieldSchema::integer("tasks_completed", "Tasks completed").min(0.0),
                FieldSchema::integer("focus_level", "Focus (1–10)").min(1.0).max(10.0),
                FieldSchema::single_choice(
                    "focus_category",
                    "Focus category",
                    vec![
                        Choice::new("code", "Code"),
                        Choice::new("writing", "Writing"),
                        Choice::new("meetings", "Meetings"),
                        Choice::new("other", "Other"),
                    ],
                )
                .optional(),
                FieldSchema::text("notes", "Notes").optional(),
            ],
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearningEntry {
    #[serde(flatten)]
    pub meta: EntryMeta,
    pub study_hours: f64,
    pub topics: Option<String>,
    pub projects: Option<String>,
    pub source_type: Option<String>,
    #[serde(default)]
    pub course_id: Option<i64>,
    pub notes: Option<String>,
}

impl LearningEntry {
    /// Schema with a course picker; choices are the user's courses as `(id, title)`.
    pub fn schema_with_courses(courses: &[(i64, String)]) -> ResourceSchema {
        let choices = courses
            .iter()
            .map(|(id, title)| Choice::new(id.to_string(), title.clone()))
            .collect();
        Self::schema().with_field(
            FieldSchema::single_choice("course_id", "Course", choices)
                .encoded_as(ValueEncoding::Number)
                .optional(),
        )
    }
}

impl Resource for LearningEntry {
    const NAME: &'static str = "learning";

    fn schema() -> ResourceSchema {
        ResourceSchema::new(
            Self::NAME,
            "Learning",
            vec![
                FieldSchema::decimal("study_hours", "Study hours").min(0.0).max(24.0),
                FieldSchema::text("topics", "Topics").optional(),
                FieldSchema::text("projects", "Projects").optional(),
                FieldSchema::single_choice(
                    "source_type",
                    "Source",
                    vec![
                        Choice::new("book", "Book"),
                        Choice::new("course", "Course"),
                        Choice::new("podcast", "Podcast"),
                        Choice::new("other", "Other"),
                    ],
                )
                .optional(),
                FieldSchema::text("notes", "Notes").optional(),
            ],
        )
    }
}

/// Schemas of every built-in resource.
pub fn builtin_schemas() -> Vec<ResourceSchema> {
    vec![
        HealthEntry::schema(),
        FinanceEntry::schema(),
        ProductivityEntry::schema(),
        LearningEntry::schema(),
    ]
}
