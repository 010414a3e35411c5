use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub header_bold: bool,
    pub text_color: String,
    pub border_color: String,
    pub border_width: f32,
    pub header_fill: String,
    pub name_fill: String,
    pub background: String,
    pub legend_heading: String,
}

impl Theme {
    /// Black grid on white, 14px Arial.
    pub fn classic() -> Self {
        Self {
            font_family: "Arial, Helvetica, sans-serif".to_string(),
            font_size: 14.0,
            header_bold: true,
            text_color: "#000000".to_string(),
            border_color: "#000000".to_string(),
            border_width: 1.0,
            header_fill: "#FFFFFF".to_string(),
            name_fill: "#FFFFFF".to_string(),
            background: "#FFFFFF".to_string(),
            legend_heading: "Legend:".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            header_bold: true,
            text_color: "#1C2430".to_string(),
            border_color: "#C7D2E5".to_string(),
            border_width: 1.0,
            header_fill: "#EEF2F8".to_string(),
            name_fill: "#F8FAFF".to_string(),
            background: "#FFFFFF".to_string(),
            legend_heading: "Legend".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
