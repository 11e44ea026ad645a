use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::{lenient_datetime, Identified};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CustomerStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
}

impl Address {
    /// Location string used by the customer search: `"{city} {state}"`.
    pub fn location(&self) -> String {
        format!("{} {}", self.city.trim(), self.state.trim())
            .trim()
            .to_string()
    }

    /// Non-empty printable lines.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.street.trim().is_empty() {
            lines.push(self.street.trim().to_string());
        }
        let city_line = [self.city.trim(), self.state.trim(), self.pincode.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        if !city_line.is_empty() {
            lines.push(city_line);
        }
        if !self.country.trim().is_empty() {
            lines.push(self.country.trim().to_string());
        }
        lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessInfo {
    pub gst_number: Option<String>,
    pub pan_number: Option<String>,
    pub billing_address: Option<Address>,
    pub same_as_shipping: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub name: String,
    pub designation: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase", default)]
pub struct Customer {
    #[serde(rename = "_id")]
    pub id: String,
    pub company_name: String,
    pub status: String,
    pub address: Address,
    pub business_info: BusinessInfo,
    pub contacts: Vec<Contact>,
    #[serde(with = "lenient_datetime", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(with = "lenient_datetime", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

wire_record!(Customer);

impl Identified for Customer {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Customer {
    pub fn status(&self) -> Option<CustomerStatus> {
        self.status.parse().ok()
    }

    /// Billing address as displayed: the shipping address when flagged as the same.
    pub fn billing_address(&self) -> Option<&Address> {
        if self.business_info.same_as_shipping {
            Some(&self.address)
        } else {
            self.business_info.billing_address.as_ref()
        }
    }

    /// First contact flagged primary. Several may be flagged; none are corrected.
    pub fn primary_contact(&self) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.is_primary)
    }

    /// Contacts for display: primaries first, then by name.
    pub fn sorted_contacts(&self) -> Vec<&Contact> {
        let mut contacts: Vec<&Contact> = self.contacts.iter().collect();
        contacts.sort_by(|a, b| {
            b.is_primary
                .cmp(&a.is_primary)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        contacts
    }
}
