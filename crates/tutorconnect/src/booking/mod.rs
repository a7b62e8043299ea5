/// Booking flow: slot reconciliation, fees, and the booking modal's wizard
pub mod availability;
mod error;
pub mod fees;
pub mod wizard;

pub use availability::{
    available_slots, bookable_times, clear_all, is_master_slot, toggle_slot, BandSlots, DayBand,
    SlotSelection, TIME_SLOTS,
};
pub use error::BookingError;
pub use fees::{FeeBreakdown, LESSON_DURATION_HOURS, PLATFORM_FEE};
pub use wizard::{BookingRequest, BookingWizard, WizardStep};
