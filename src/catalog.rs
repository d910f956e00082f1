/// Colour family a subject is drawn with on the wheel and in the session view
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Accent {
    Gold,
    Purple,
    Pink,
    Green,
    Blue,
}

/// A subject on the wheel and the study lengths (minutes) it can land on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    pub name: &'static str,
    pub accent: Accent,
    pub durations: &'static [u32],
}

const SUBJECTS: [Subject; 6] = [
    Subject {
        name: "Mathematics",
        accent: Accent::Gold,
        durations: &[15, 30, 45, 60],
    },
    Subject {
        name: "Science",
        accent: Accent::Purple,
        durations: &[20, 40, 60, 90],
    },
    Subject {
        name: "English",
        accent: Accent::Pink,
        durations: &[15, 25, 45, 60],
    },
    Subject {
        name: "History",
        accent: Accent::Green,
        durations: &[20, 30, 50, 75],
    },
    Subject {
        name: "Language",
        accent: Accent::Blue,
        durations: &[15, 30, 45, 60],
    },
    Subject {
        name: "Arts",
        accent: Accent::Gold,
        durations: &[30, 45, 60, 90],
    },
];

/// Fixed, non-empty set of subjects. Every subject has at least one duration.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    subjects: &'static [Subject],
}

impl Catalog {
    pub fn standard() -> Self {
        Self {
            subjects: &SUBJECTS,
        }
    }

    pub fn subjects(&self) -> &'static [Subject] {
        self.subjects
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&'static Subject> {
        self.subjects.iter().find(|s| s.name == name)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
