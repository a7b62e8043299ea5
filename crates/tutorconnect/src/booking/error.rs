//! Error types for the booking flow.

use chrono::NaiveDate;
use thiserror::Error;

use super::wizard::WizardStep;

/// Errors raised while picking a slot, paying, or confirming a booking.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// A time was picked before a date
    #[error("Please select a date first")]
    DateNotSelected,

    /// The chosen time is not offered on the chosen date
    #[error("{time} is not available on {date}")]
    SlotUnavailable { date: NaiveDate, time: String },

    /// The time is not one of the bookable hourly slots
    #[error("Unknown time slot: {0}")]
    UnknownSlot(String),

    /// Tried to leave slot selection without a date and time
    #[error("A date and time must be selected before checkout")]
    SelectionIncomplete,

    /// Tried to pay without choosing a payment method
    #[error("Please choose a payment method")]
    PaymentMethodMissing,

    /// The action does not apply to the wizard's current step
    #[error("Cannot {action} while the booking is at step {step:?}")]
    WrongStep { action: &'static str, step: WizardStep },

    /// No booking wizard is open for this session
    #[error("No booking is in progress")]
    NotOpen,

    /// Only students can book lessons
    #[error("Only students can book lessons")]
    NotAStudent,
}
