use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Office 365 connector "message card" document
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageCard {
    #[serde(rename = "@type")]
    pub card_type: String,
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "themeColor")]
    pub theme_color: String,
    pub summary: String,
    pub sections: Vec<Section>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Section {
    #[serde(rename = "activityTitle")]
    pub activity_title: String,
    pub facts: Vec<Fact>,
    pub markdown: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fact {
    pub name: String,
    pub value: String,
}

impl Fact {
    fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

impl MessageCard {
    /// Value of the fact called `name` in the first section
    pub fn fact(&self, name: &str) -> Option<&str> {
        self.sections
            .first()?
            .facts
            .iter()
            .find(|fact| fact.name == name)
            .map(|fact| fact.value.as_str())
    }
}

/// `M/D/YYYY, h:mm:ss AM`, the way a US-locale date string reads
const RELEASED_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Build the release card, stamped with the current local time
pub fn compose(
    project_name: &str,
    version: &str,
    changelog: &str,
    release_manager: &str,
) -> MessageCard {
    compose_at(project_name, version, changelog, release_manager, &Local::now())
}

/// Build the release card for a given release time
pub fn compose_at<Tz: TimeZone>(
    project_name: &str,
    version: &str,
    changelog: &str,
    release_manager: &str,
    released: &DateTime<Tz>,
) -> MessageCard
where
    Tz::Offset: std::fmt::Display,
{
    MessageCard {
        card_type: "MessageCard".to_string(),
        context: "https://schema.org/extensions".to_string(),
        theme_color: "0078D7".to_string(),
        summary: format!("{project_name} {version} Released"),
        sections: vec![Section {
            activity_title: format!("🚀 {project_name} version {version} is now on production!"),
            facts: vec![
                Fact::new("Project", project_name),
                Fact::new("Version", version),
                Fact::new("Released", released.format(RELEASED_FORMAT).to_string()),
                Fact::new("Release Manager", release_manager),
                Fact::new("Changelog", changelog),
            ],
            markdown: true,
        }],
    }
}
