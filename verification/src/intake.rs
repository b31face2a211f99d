//! Visitor details collected on the first screen.

use serde::Serialize;
use svims_types::{IdentityNumber, Timestamp, VisitPurpose};

use crate::WorkflowError;

/// Mutable working copy of the intake form, owned by one workflow.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VisitorIntake {
    full_name: String,
    identity_number: IdentityNumber,
    mobile: String,
    address: Option<String>,
    host: Option<String>,
    purpose: VisitPurpose,
    arrived_at: Timestamp,
}

/// One field change on the intake form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntakeEdit {
    FullName(String),
    IdentityNumber(String),
    Mobile(String),
    /// Empty clears the field.
    Address(String),
    /// Person being visited. Empty clears the field.
    Host(String),
    Purpose(VisitPurpose),
}

impl IntakeEdit {
    /// Build a purpose edit from a free-text label, rejecting anything that
    /// is not one of the known purposes.
    pub fn purpose_label(raw: &str) -> Result<Self, WorkflowError> {
        raw.parse::<VisitPurpose>()
            .map(Self::Purpose)
            .map_err(|e| WorkflowError::validation("purpose", e.to_string()))
    }
}

impl VisitorIntake {
    /// Start an empty form. The arrival time is fixed here and never edited.
    pub fn new(arrived_at: Timestamp) -> Self {
        Self {
            arrived_at,
            ..Self::default()
        }
    }

    pub fn apply(&mut self, edit: IntakeEdit) {
        match edit {
            IntakeEdit::FullName(name) => self.full_name = name.trim().to_string(),
            IntakeEdit::IdentityNumber(raw) => self.identity_number = IdentityNumber::new(raw),
            IntakeEdit::Mobile(mobile) => self.mobile = mobile.trim().to_string(),
            IntakeEdit::Address(address) => self.address = non_empty(address),
            IntakeEdit::Host(host) => self.host = non_empty(host),
            IntakeEdit::Purpose(purpose) => self.purpose = purpose,
        }
    }

    /// Everything a code request needs: a name, an identity number, and a
    /// mobile number to send the code to.
    pub fn validate_for_code_request(&self) -> Result<(), WorkflowError> {
        if self.full_name.is_empty() {
            return Err(WorkflowError::validation("full name", "required"));
        }
        if self.identity_number.is_empty() {
            return Err(WorkflowError::validation("identity number", "required"));
        }
        self.validate_mobile()
    }

    pub fn validate_mobile(&self) -> Result<(), WorkflowError> {
        if self.mobile.is_empty() {
            return Err(WorkflowError::validation("mobile", "required"));
        }
        let well_formed = self.mobile.chars().any(|c| c.is_ascii_digit())
            && self
                .mobile
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'));
        if !well_formed {
            return Err(WorkflowError::validation(
                "mobile",
                "only digits, spaces, '+', '-' and parentheses are allowed",
            ));
        }
        Ok(())
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn identity_number(&self) -> &IdentityNumber {
        &self.identity_number
    }

    pub fn mobile(&self) -> &str {
        &self.mobile
    }

    /// Mobile number with all but the last two digits hidden, for logs.
    pub fn masked_mobile(&self) -> String {
        let visible: String = {
            let digits: Vec<char> = self.mobile.chars().filter(|c| c.is_ascii_digit()).collect();
            digits[digits.len().saturating_sub(2)..].iter().collect()
        };
        format!("******{visible}")
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn purpose(&self) -> VisitPurpose {
        self.purpose
    }

    pub fn arrived_at(&self) -> Timestamp {
        self.arrived_at
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
