//! The multi-step booking modal: slot selection, checkout, payment, confirmation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::availability::SlotSelection;
use super::error::BookingError;
use crate::model::{PaymentMethod, WeeklyAvailability};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WizardStep {
    SelectSlot,
    Checkout,
    Processing,
    Confirmed,
}

/// What the student settled on, handed to the marketplace on confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub teacher_id: String,
    pub date: NaiveDate,
    pub time: String,
    pub method: PaymentMethod,
}

/// State of one booking modal. A fresh wizard always starts at slot selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingWizard {
    teacher_id: String,
    step: WizardStep,
    selection: SlotSelection,
    payment_method: Option<PaymentMethod>,
}

impl BookingWizard {
    pub fn open(teacher_id: impl Into<String>) -> Self {
        Self {
            teacher_id: teacher_id.into(),
            step: WizardStep::SelectSlot,
            selection: SlotSelection::default(),
            payment_method: None,
        }
    }

    pub fn teacher_id(&self) -> &str {
        &self.teacher_id
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn selection(&self) -> &SlotSelection {
        &self.selection
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    fn expect_step(&self, step: WizardStep, action: &'static str) -> Result<(), BookingError> {
        if self.step == step {
            Ok(())
        } else {
            Err(BookingError::WrongStep {
                action,
                step: self.step,
            })
        }
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Result<(), BookingError> {
        self.expect_step(WizardStep::SelectSlot, "select a date")?;
        self.selection.select_date(date);
        Ok(())
    }

    pub fn select_time(
        &mut self,
        availability: &WeeklyAvailability,
        time: &str,
    ) -> Result<(), BookingError> {
        self.expect_step(WizardStep::SelectSlot, "select a time")?;
        self.selection.select_time(availability, time)
    }

    pub fn proceed_to_checkout(&mut self) -> Result<(), BookingError> {
        self.expect_step(WizardStep::SelectSlot, "proceed to checkout")?;
        if self.selection.complete().is_none() {
            return Err(BookingError::SelectionIncomplete);
        }
        self.step = WizardStep::Checkout;
        Ok(())
    }

    pub fn select_payment_method(&mut self, method: PaymentMethod) -> Result<(), BookingError> {
        self.expect_step(WizardStep::Checkout, "choose a payment method")?;
        self.payment_method = Some(method);
        Ok(())
    }

    /// Moves to `Processing`; the pay action is only enabled once a method is chosen.
    pub fn begin_payment(&mut self) -> Result<PaymentMethod, BookingError> {
        self.expect_step(WizardStep::Checkout, "pay")?;
        let method = self
            .payment_method
            .ok_or(BookingError::PaymentMethodMissing)?;
        self.step = WizardStep::Processing;
        Ok(method)
    }

    pub fn payment_succeeded(&mut self) -> Result<(), BookingError> {
        self.expect_step(WizardStep::Processing, "complete payment")?;
        self.step = WizardStep::Confirmed;
        Ok(())
    }

    /// Returns to checkout when the simulated payment never resolved.
    pub fn payment_aborted(&mut self) {
        if self.step == WizardStep::Processing {
            self.step = WizardStep::Checkout;
        }
    }

    /// Returns a confirmed wizard to slot selection after its slot was taken
    /// away. The date is kept; the time must be picked again.
    pub fn slot_withdrawn(&mut self) {
        if self.step != WizardStep::Confirmed {
            return;
        }
        if let Some(date) = self.selection.date() {
            self.selection.select_date(date);
        }
        self.step = WizardStep::SelectSlot;
    }

    /// The confirmed request, available once payment has gone through.
    pub fn confirmation(&self) -> Result<BookingRequest, BookingError> {
        self.expect_step(WizardStep::Confirmed, "confirm the booking")?;
        let (date, time) = self
            .selection
            .complete()
            .ok_or(BookingError::SelectionIncomplete)?;
        let method = self
            .payment_method
            .ok_or(BookingError::PaymentMethodMissing)?;

        Ok(BookingRequest {
            teacher_id: self.teacher_id.clone(),
            date,
            time: time.to_string(),
            method,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Day;

    fn availability() -> WeeklyAvailability {
        [(Day::Monday, vec!["14:00".to_string(), "15:00".to_string()])]
            .into_iter()
            .collect()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn test_full_walkthrough() {
        let mut wizard = BookingWizard::open("t1");
        assert_eq!(wizard.step(), WizardStep::SelectSlot);

        wizard.select_date(monday()).unwrap();
        wizard.select_time(&availability(), "14:00").unwrap();
        wizard.proceed_to_checkout().unwrap();
        wizard.select_payment_method(PaymentMethod::Payfast).unwrap();
        assert_eq!(wizard.begin_payment(), Ok(PaymentMethod::Payfast));
        assert_eq!(wizard.step(), WizardStep::Processing);
        wizard.payment_succeeded().unwrap();

        let request = wizard.confirmation().unwrap();
        assert_eq!(request.teacher_id, "t1");
        assert_eq!(request.date, monday());
        assert_eq!(request.time, "14:00");
        assert_eq!(request.method, PaymentMethod::Payfast);
    }

    #[test]
    fn test_checkout_needs_date_and_time() {
        let mut wizard = BookingWizard::open("t1");
        assert_eq!(
            wizard.proceed_to_checkout(),
            Err(BookingError::SelectionIncomplete)
        );

        wizard.select_date(monday()).unwrap();
        assert_eq!(
            wizard.proceed_to_checkout(),
            Err(BookingError::SelectionIncomplete)
        );
        assert_eq!(wizard.step(), WizardStep::SelectSlot);
    }

    #[test]
    fn test_pay_needs_payment_method() {
        let mut wizard = BookingWizard::open("t1");
        wizard.select_date(monday()).unwrap();
        wizard.select_time(&availability(), "15:00").unwrap();
        wizard.proceed_to_checkout().unwrap();

        assert_eq!(
            wizard.begin_payment(),
            Err(BookingError::PaymentMethodMissing)
        );
        assert_eq!(wizard.step(), WizardStep::Checkout);
    }

    #[test]
    fn test_confirmation_before_payment_is_rejected() {
        let mut wizard = BookingWizard::open("t1");
        wizard.select_date(monday()).unwrap();
        wizard.select_time(&availability(), "15:00").unwrap();
        wizard.proceed_to_checkout().unwrap();

        assert!(matches!(
            wizard.confirmation(),
            Err(BookingError::WrongStep { .. })
        ));
    }

    #[test]
    fn test_reopening_resets_everything() {
        let mut wizard = BookingWizard::open("t1");
        wizard.select_date(monday()).unwrap();
        wizard.select_time(&availability(), "15:00").unwrap();
        wizard.proceed_to_checkout().unwrap();

        let wizard = BookingWizard::open("t2");
        assert_eq!(wizard.step(), WizardStep::SelectSlot);
        assert_eq!(wizard.selection(), &SlotSelection::default());
        assert_eq!(wizard.payment_method(), None);
    }

    #[test]
    fn test_aborted_payment_returns_to_checkout() {
        let mut wizard = BookingWizard::open("t1");
        wizard.select_date(monday()).unwrap();
        wizard.select_time(&availability(), "15:00").unwrap();
        wizard.proceed_to_checkout().unwrap();
        wizard.select_payment_method(PaymentMethod::Ozow).unwrap();
        wizard.begin_payment().unwrap();

        wizard.payment_aborted();
        assert_eq!(wizard.step(), WizardStep::Checkout);
    }

    #[test]
    fn test_withdrawn_slot_returns_to_selection() {
        let mut wizard = BookingWizard::open("t1");
        wizard.select_date(monday()).unwrap();
        wizard.select_time(&availability(), "15:00").unwrap();

        // Only a confirmed wizard is rewound
        wizard.slot_withdrawn();
        assert_eq!(wizard.selection().time(), Some("15:00"));

        wizard.proceed_to_checkout().unwrap();
        wizard.select_payment_method(PaymentMethod::Ozow).unwrap();
        wizard.begin_payment().unwrap();
        wizard.payment_succeeded().unwrap();

        wizard.slot_withdrawn();
        assert_eq!(wizard.step(), WizardStep::SelectSlot);
        assert_eq!(wizard.selection().date(), Some(monday()));
        assert_eq!(wizard.selection().time(), None);
        wizard.select_time(&availability(), "14:00").unwrap();
    }
}
