use serde::{Deserialize, Serialize};

pub const NO_PRICE_INFO: &str = "No info";

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedText {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHours {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_now: Option<bool>,
}

/// A point of interest as returned by the Places text search, plus the two
/// fields derived from it by [`Place::annotate`].
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_opening_hours: Option<OpeningHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<String>,
    #[serde(default)]
    pub is_open: bool,
    #[serde(default)]
    pub price_label: String,
}

impl Place {
    /// Fill in `is_open` and `price_label`.
    ///
    /// A place without opening hours data is treated as open; one with hours
    /// but no `openNow` flag is treated as closed.
    pub fn annotate(&mut self) {
        self.is_open = match &self.current_opening_hours {
            None => true,
            Some(hours) => hours.open_now.unwrap_or(false),
        };
        self.price_label = PriceLevel::label_for(self.price_level.as_deref()).to_string();
    }

    pub fn name(&self) -> &str {
        self.display_name
            .as_ref()
            .map(|name| name.text.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceLevel {
    Free,
    Inexpensive,
    Moderate,
    Expensive,
    VeryExpensive,
}

impl PriceLevel {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PRICE_LEVEL_FREE" => Some(PriceLevel::Free),
            "PRICE_LEVEL_INEXPENSIVE" => Some(PriceLevel::Inexpensive),
            "PRICE_LEVEL_MODERATE" => Some(PriceLevel::Moderate),
            "PRICE_LEVEL_EXPENSIVE" => Some(PriceLevel::Expensive),
            "PRICE_LEVEL_VERY_EXPENSIVE" => Some(PriceLevel::VeryExpensive),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriceLevel::Free => "Free",
            PriceLevel::Inexpensive => "Inexpensive ($)",
            PriceLevel::Moderate => "Moderate ($$)",
            PriceLevel::Expensive => "Expensive ($$$)",
            PriceLevel::VeryExpensive => "Very Expensive ($$$$)",
        }
    }

    pub fn label_for(code: Option<&str>) -> &'static str {
        code.and_then(PriceLevel::from_code)
            .map(|level| level.label())
            .unwrap_or(NO_PRICE_INFO)
    }
}
