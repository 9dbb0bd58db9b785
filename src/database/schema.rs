//! Static table descriptors for the four collections.
//!
//! The list pipeline validates every filter, projection and sort field
//! against these descriptors before any SQL is built, and uses the column
//! type to cast bound parameters.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    TextArray,
    Integer,
    Float,
    Boolean,
    Timestamp,
    Uuid,
}

impl ColumnType {
    /// Cast applied to a text-bound placeholder for this column.
    pub fn placeholder_cast(&self) -> &'static str {
        match self {
            ColumnType::Text | ColumnType::TextArray => "",
            ColumnType::Integer => "::integer",
            ColumnType::Float => "::double precision",
            ColumnType::Boolean => "::boolean",
            ColumnType::Timestamp => "::timestamptz",
            ColumnType::Uuid => "::uuid",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
    /// Hidden columns are never selected, filtered or sorted on.
    pub hidden: bool,
}

const fn col(name: &'static str, kind: ColumnType) -> Column {
    Column { name, kind, hidden: false }
}

const fn hidden(name: &'static str, kind: ColumnType) -> Column {
    Column { name, kind, hidden: true }
}

/// Related records embedded after a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Populate {
    /// Attach `courses: [...]` to each bootcamp.
    Courses,
    /// Replace the `bootcamp` id with `{ id, name, description }`.
    BootcampSummary,
}

#[derive(Debug)]
pub struct Resource {
    pub name: &'static str,
    pub table: &'static str,
    pub columns: &'static [Column],
    pub populate: Option<Populate>,
}

impl Resource {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name && !c.hidden)
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.hidden)
    }
}

use ColumnType::*;

pub static BOOTCAMPS: Resource = Resource {
    name: "bootcamp",
    table: "bootcamps",
    columns: &[
        col("id", Uuid),
        col("name", Text),
        col("slug", Text),
        col("description", Text),
        col("website", Text),
        col("email", Text),
        col("phone", Text),
        col("address", Text),
        col("careers", TextArray),
        col("averageRating", Float),
        col("averageCost", Integer),
        col("photo", Text),
        col("housing", Boolean),
        col("jobAssistance", Boolean),
        col("jobGuarantee", Boolean),
        col("acceptGi", Boolean),
        col("createdAt", Timestamp),
        col("user", Uuid),
    ],
    populate: Some(Populate::Courses),
};

pub static COURSES: Resource = Resource {
    name: "course",
    table: "courses",
    columns: &[
        col("id", Uuid),
        col("title", Text),
        col("description", Text),
        col("weeks", Text),
        col("tuition", Integer),
        col("minimumSkill", Text),
        col("scholarshipAvailable", Boolean),
        col("createdAt", Timestamp),
        col("bootcamp", Uuid),
        col("user", Uuid),
    ],
    populate: Some(Populate::BootcampSummary),
};

pub static REVIEWS: Resource = Resource {
    name: "review",
    table: "reviews",
    columns: &[
        col("id", Uuid),
        col("title", Text),
        col("text", Text),
        col("rating", Integer),
        col("createdAt", Timestamp),
        col("bootcamp", Uuid),
        col("user", Uuid),
    ],
    populate: Some(Populate::BootcampSummary),
};

pub static USERS: Resource = Resource {
    name: "user",
    table: "users",
    columns: &[
        col("id", Uuid),
        col("name", Text),
        col("email", Text),
        col("role", Text),
        col("phone", Text),
        hidden("password", Text),
        col("createdAt", Timestamp),
    ],
    populate: None,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_columns_are_not_resolvable() {
        assert!(USERS.column("email").is_some());
        assert!(USERS.column("password").is_none());
        assert!(USERS.visible_columns().all(|c| c.name != "password"));
    }

    #[test]
    fn every_resource_sorts_by_creation_time() {
        for resource in [&BOOTCAMPS, &COURSES, &REVIEWS, &USERS] {
            let created = resource.column("createdAt").expect("createdAt column");
            assert_eq!(created.kind, ColumnType::Timestamp);
            assert!(resource.column("id").is_some());
        }
    }
}
