use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::directives::ChartDataPoint;
use crate::gamification::Badge;
use crate::llm::ImageAttachment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// One entry of the conversation log. Never edited after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    #[serde(
        rename = "image_url",
        serialize_with = "image_as_data_url",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<ImageAttachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<&'static Badge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<Vec<ChartDataPoint>>,
    pub is_receipt: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            image: None,
            badge: None,
            chart_title: None,
            chart_data: None,
            is_receipt: false,
            created_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>, image: Option<ImageAttachment>) -> Self {
        Self {
            image,
            ..Self::new(Sender::User, text)
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self::new(Sender::Ai, text)
    }

    pub fn has_chart(&self) -> bool {
        self.chart_data.as_ref().is_some_and(|d| !d.is_empty())
    }
}

fn image_as_data_url<S: Serializer>(
    image: &Option<ImageAttachment>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match image {
        Some(image) => serializer.serialize_some(&image.data_url()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(Message::ai("a").id, Message::ai("a").id);
    }

    #[test]
    fn serializes_for_the_renderer() {
        let image = ImageAttachment::new(vec![1, 2, 3], "image/png");
        let json = serde_json::to_value(Message::user("look", Some(image))).unwrap();
        assert_eq!(json["sender"], "user");
        assert_eq!(json["image_url"], "data:image/png;base64,AQID");
        assert_eq!(json["is_receipt"], false);
        assert!(json.get("badge").is_none());
    }
}
