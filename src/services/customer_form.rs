use once_cell::sync::Lazy;
use regex::Regex;
use validator::{Validate, ValidationError};

use crate::{
    errors::{ConsoleError, ConsoleResult},
    models::{Address, BusinessInfo, Contact, Customer, CustomerPayload, CustomerStatus},
};

static GSTIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{2}[A-Z]{5}\d{4}[A-Z][1-9A-Z]Z[0-9A-Z]$").expect("valid GSTIN pattern")
});
static PAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{5}\d{4}[A-Z]$").expect("valid PAN pattern"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 \-]{6,17}$").expect("valid phone pattern"));

/// One editable row of the contacts section. Blank text means "not given".
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ContactForm {
    #[validate(length(min = 1, max = 120, message = "Contact name is required"))]
    pub name: String,
    pub designation: String,
    #[validate(custom = "validate_phone")]
    pub phone: String,
    #[validate(custom = "validate_email")]
    pub email: String,
    pub is_primary: bool,
}

impl ContactForm {
    fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            designation: self.designation.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            is_primary: self.is_primary,
        }
    }

    fn into_contact(self) -> Contact {
        Contact {
            name: self.name,
            designation: non_blank(self.designation),
            phone: non_blank(self.phone),
            email: non_blank(self.email),
            is_primary: self.is_primary,
        }
    }
}

impl From<&Contact> for ContactForm {
    fn from(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            designation: contact.designation.clone().unwrap_or_default(),
            phone: contact.phone.clone().unwrap_or_default(),
            email: contact.email.clone().unwrap_or_default(),
            is_primary: contact.is_primary,
        }
    }
}

/// Create/edit form behind the customer modal.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct CustomerForm {
    #[validate(length(min = 1, max = 200, message = "Company name is required"))]
    pub company_name: String,
    #[validate(custom = "validate_status")]
    pub status: String,
    pub address: Address,
    #[validate(custom = "validate_gstin")]
    pub gst_number: String,
    #[validate(custom = "validate_pan")]
    pub pan_number: String,
    pub billing_address: Address,
    pub same_as_shipping: bool,
    pub contacts: Vec<ContactForm>,
}

impl Default for CustomerForm {
    fn default() -> Self {
        Self {
            company_name: String::new(),
            status: CustomerStatus::Active.to_string(),
            address: Address::default(),
            gst_number: String::new(),
            pan_number: String::new(),
            billing_address: Address::default(),
            same_as_shipping: false,
            contacts: vec![ContactForm {
                is_primary: true,
                ..Default::default()
            }],
        }
    }
}

impl CustomerForm {
    /// Blank form with a single primary contact row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Form pre-filled from a stored customer for editing.
    pub fn from_customer(customer: &Customer) -> Self {
        let info = &customer.business_info;
        Self {
            company_name: customer.company_name.clone(),
            status: if customer.status.trim().is_empty() {
                CustomerStatus::Active.to_string()
            } else {
                customer.status.clone()
            },
            address: customer.address.clone(),
            gst_number: info.gst_number.clone().unwrap_or_default(),
            pan_number: info.pan_number.clone().unwrap_or_default(),
            billing_address: info.billing_address.clone().unwrap_or_default(),
            same_as_shipping: info.same_as_shipping,
            contacts: customer.contacts.iter().map(ContactForm::from).collect(),
        }
    }

    pub fn add_contact(&mut self) -> usize {
        let is_primary = self.contacts.is_empty();
        self.contacts.push(ContactForm {
            is_primary,
            ..Default::default()
        });
        self.contacts.len() - 1
    }

    pub fn remove_contact(&mut self, index: usize) -> Option<ContactForm> {
        (index < self.contacts.len()).then(|| self.contacts.remove(index))
    }

    /// Marks one contact primary and clears the flag on the others.
    pub fn set_primary(&mut self, index: usize) -> bool {
        if index >= self.contacts.len() {
            return false;
        }
        for (i, contact) in self.contacts.iter_mut().enumerate() {
            contact.is_primary = i == index;
        }
        true
    }

    /// Toggling on copies the shipping address into the billing fields.
    pub fn set_same_as_shipping(&mut self, same: bool) {
        self.same_as_shipping = same;
        if same {
            self.billing_address = self.address.clone();
        }
    }

    fn normalized(&self) -> Self {
        let mut form = self.clone();
        form.company_name = form.company_name.trim().to_string();
        form.status = form.status.trim().to_lowercase();
        form.gst_number = form.gst_number.trim().to_uppercase();
        form.pan_number = form.pan_number.trim().to_uppercase();
        form.contacts = form.contacts.iter().map(ContactForm::normalized).collect();
        if form.same_as_shipping {
            form.billing_address = form.address.clone();
        }
        form
    }

    /// Validates the form and builds the request body.
    pub fn submit(&self) -> ConsoleResult<CustomerPayload> {
        let form = self.normalized();
        form.validate()?;
        for (index, contact) in form.contacts.iter().enumerate() {
            contact.validate().map_err(|e| {
                ConsoleError::ValidationError(format!("contact {}: {}", index + 1, e))
            })?;
        }

        let billing_address = if form.same_as_shipping || form.billing_address.is_empty() {
            None
        } else {
            Some(form.billing_address.clone())
        };

        Ok(CustomerPayload {
            company_name: form.company_name,
            status: form.status,
            address: form.address,
            business_info: BusinessInfo {
                gst_number: non_blank(form.gst_number),
                pan_number: non_blank(form.pan_number),
                billing_address,
                same_as_shipping: form.same_as_shipping,
            },
            contacts: form
                .contacts
                .into_iter()
                .map(ContactForm::into_contact)
                .collect(),
        })
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn validate_status(status: &str) -> Result<(), ValidationError> {
    if status.parse::<CustomerStatus>().is_ok() {
        Ok(())
    } else {
        let mut err = ValidationError::new("status");
        err.message = Some("Status must be active or inactive".into());
        Err(err)
    }
}

fn validate_pattern(
    value: &str,
    pattern: &Regex,
    code: &'static str,
    message: &'static str,
) -> Result<(), ValidationError> {
    if value.is_empty() || pattern.is_match(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new(code);
        err.message = Some(message.into());
        Err(err)
    }
}

fn validate_gstin(value: &str) -> Result<(), ValidationError> {
    validate_pattern(value, &GSTIN_RE, "gst_number", "GST number must be a 15 character GSTIN")
}

fn validate_pan(value: &str) -> Result<(), ValidationError> {
    validate_pattern(value, &PAN_RE, "pan_number", "PAN must look like ABCDE1234F")
}

fn validate_email(value: &str) -> Result<(), ValidationError> {
    validate_pattern(value, &EMAIL_RE, "email", "Email address is not valid")
}

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    validate_pattern(value, &PHONE_RE, "phone", "Phone number is not valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn filled() -> CustomerForm {
        let mut form = CustomerForm::new();
        form.company_name = "  Deccan Wires ".into();
        form.address = Address {
            street: "12 MIDC Road".into(),
            city: "Pune".into(),
            state: "Maharashtra".into(),
            pincode: "411019".into(),
            country: "India".into(),
        };
        form.gst_number = "27aaapl1234c1z5".into();
        form.pan_number = "AAAPL1234C".into();
        form.contacts[0].name = "Anita Kulkarni".into();
        form.contacts[0].email = "anita@deccanwires.in".into();
        form.contacts[0].phone = "+91 98220 12345".into();
        form
    }

    #[test]
    fn valid_form_builds_trimmed_payload() {
        let payload = filled().submit().unwrap();
        assert_eq!(payload.company_name, "Deccan Wires");
        assert_eq!(payload.status, "active");
        assert_eq!(
            payload.business_info.gst_number.as_deref(),
            Some("27AAAPL1234C1Z5")
        );
        assert!(payload.business_info.billing_address.is_none());
        assert_eq!(payload.contacts.len(), 1);
        assert!(payload.contacts[0].is_primary);
        assert_eq!(payload.contacts[0].designation, None);
    }

    #[test]
    fn company_name_is_required() {
        let mut form = filled();
        form.company_name = "   ".into();
        assert_matches!(form.submit(), Err(ConsoleError::ValidationError(_)));
    }

    #[test]
    fn malformed_tax_ids_are_rejected() {
        let mut form = filled();
        form.gst_number = "27AAAPL1234".into();
        assert_matches!(form.submit(), Err(ConsoleError::ValidationError(msg)) if msg.to_lowercase().contains("gst"));

        let mut form = filled();
        form.pan_number = "1234".into();
        assert!(form.submit().is_err());

        let mut form = filled();
        form.gst_number.clear();
        form.pan_number.clear();
        assert!(form.submit().is_ok());
    }

    #[test]
    fn contact_errors_name_the_row() {
        let mut form = filled();
        let idx = form.add_contact();
        form.contacts[idx].name = "Ravi".into();
        form.contacts[idx].email = "ravi-at-example".into();
        assert_matches!(form.submit(), Err(ConsoleError::ValidationError(msg)) if msg.starts_with("contact 2"));
    }

    #[test]
    fn same_as_shipping_copies_address() {
        let mut form = filled();
        form.set_same_as_shipping(true);
        assert_eq!(form.billing_address, form.address);

        let payload = form.submit().unwrap();
        assert!(payload.business_info.same_as_shipping);
        assert!(payload.business_info.billing_address.is_none());
    }

    #[test]
    fn separate_billing_address_is_sent() {
        let mut form = filled();
        form.billing_address = Address {
            city: "Mumbai".into(),
            ..Default::default()
        };
        let payload = form.submit().unwrap();
        assert_eq!(
            payload.business_info.billing_address.unwrap().city,
            "Mumbai"
        );
    }

    #[test]
    fn set_primary_is_exclusive() {
        let mut form = filled();
        form.add_contact();
        form.add_contact();
        assert!(form.set_primary(2));
        let flags: Vec<bool> = form.contacts.iter().map(|c| c.is_primary).collect();
        assert_eq!(flags, vec![false, false, true]);
        assert!(!form.set_primary(9));
    }

    #[test]
    fn editing_keeps_loaded_primaries() {
        let customer = Customer {
            company_name: "Twin Metals".into(),
            contacts: vec![
                Contact {
                    name: "A".into(),
                    is_primary: true,
                    ..Default::default()
                },
                Contact {
                    name: "B".into(),
                    is_primary: true,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let form = CustomerForm::from_customer(&customer);
        assert_eq!(form.status, "active");
        assert!(form.contacts.iter().all(|c| c.is_primary));
        assert!(form.submit().is_ok());
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut form = filled();
        form.status = "archived".into();
        assert!(form.submit().is_err());
    }
}
