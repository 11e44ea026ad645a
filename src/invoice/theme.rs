use crate::models::PurchaseOrderStatus;

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components scaled to 0..=1, as the PDF colour operators take them.
    pub fn unit(self) -> [f32; 3] {
        [self.r, self.g, self.b].map(|c| f32::from(c) / 255.0)
    }
}

pub const TEXT: Color = Color::rgb(31, 41, 55);
pub const MUTED: Color = Color::rgb(107, 114, 128);
pub const ACCENT: Color = Color::rgb(30, 64, 175);
pub const BORDER: Color = Color::rgb(209, 213, 219);
pub const HEADER_FILL: Color = Color::rgb(30, 64, 175);
pub const HEADER_TEXT: Color = Color::rgb(255, 255, 255);
pub const SHADED_ROW: Color = Color::rgb(243, 244, 246);
pub const PANEL_FILL: Color = Color::rgb(249, 250, 251);
pub const BANNER_FILL: Color = Color::rgb(220, 252, 231);
pub const BANNER_TEXT: Color = Color::rgb(22, 101, 52);

/// Pill colours for an order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub fill: Color,
    pub text: Color,
}

const DRAFT: StatusStyle = StatusStyle {
    fill: Color::rgb(243, 244, 246),
    text: Color::rgb(55, 65, 81),
};

static STATUS_STYLES: [(PurchaseOrderStatus, StatusStyle); 4] = [
    (PurchaseOrderStatus::Draft, DRAFT),
    (
        PurchaseOrderStatus::Ordered,
        StatusStyle {
            fill: Color::rgb(219, 234, 254),
            text: Color::rgb(30, 64, 175),
        },
    ),
    (
        PurchaseOrderStatus::Received,
        StatusStyle {
            fill: Color::rgb(220, 252, 231),
            text: Color::rgb(22, 101, 52),
        },
    ),
    (
        PurchaseOrderStatus::Cancelled,
        StatusStyle {
            fill: Color::rgb(254, 226, 226),
            text: Color::rgb(153, 27, 27),
        },
    ),
];

/// Style for a raw status string. Anything unrecognised gets the draft style.
pub fn status_style(status: &str) -> StatusStyle {
    status
        .trim()
        .parse::<PurchaseOrderStatus>()
        .ok()
        .and_then(|parsed| {
            STATUS_STYLES
                .iter()
                .find(|(status, _)| *status == parsed)
                .map(|(_, style)| *style)
        })
        .unwrap_or(DRAFT)
}

/// Text printed inside the status pill.
pub fn status_label(status: &str) -> String {
    match status.trim().parse::<PurchaseOrderStatus>() {
        Ok(parsed) => parsed.to_string().to_uppercase(),
        Err(_) if status.trim().is_empty() => "DRAFT".to_string(),
        Err(_) => status.trim().to_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_have_distinct_styles() {
        let ordered = status_style("ordered");
        let received = status_style("RECEIVED");
        assert_ne!(ordered, DRAFT);
        assert_ne!(ordered, received);
        assert_eq!(status_style(" cancelled "), STATUS_STYLES[3].1);
    }

    #[test]
    fn unknown_status_falls_back_to_draft() {
        assert_eq!(status_style("on_hold"), DRAFT);
        assert_eq!(status_style(""), DRAFT);
        assert_eq!(status_label(""), "DRAFT");
        assert_eq!(status_label("on_hold"), "ON_HOLD");
        assert_eq!(status_label("ordered"), "ORDERED");
    }
}
