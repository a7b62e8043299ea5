//! Reconciles a teacher's weekly availability against a concrete calendar date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::BookingError;
use crate::model::{Day, WeeklyAvailability};

/// Every bookable start time, ascending. Slots are one hour long.
pub const TIME_SLOTS: [&str; 12] = [
    "08:00", "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00", "17:00",
    "18:00", "19:00",
];

/// Display band a slot falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayBand {
    Morning,
    Afternoon,
    Evening,
}

impl DayBand {
    pub const ALL: [DayBand; 3] = [DayBand::Morning, DayBand::Afternoon, DayBand::Evening];

    /// Classifies a master-list slot by its hour.
    ///
    /// Returns `None` for anything outside 08:00-19:00 or not shaped like `HH:MM`.
    pub fn of(slot: &str) -> Option<Self> {
        let hour: u32 = slot.split_once(':')?.0.parse().ok()?;
        match hour {
            8..=11 => Some(DayBand::Morning),
            12..=17 => Some(DayBand::Afternoon),
            18..=19 => Some(DayBand::Evening),
            _ => None,
        }
    }
}

/// Bookable times within one band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandSlots {
    pub band: DayBand,
    pub times: Vec<String>,
}

/// Returns true if `time` is one of the master slots.
pub fn is_master_slot(time: &str) -> bool {
    TIME_SLOTS.contains(&time)
}

/// Bookable times for `date`, ascending: the master list intersected with the
/// teacher's list for that day name.
pub fn bookable_times(availability: &WeeklyAvailability, date: NaiveDate) -> Vec<String> {
    let offered = match availability.get(&Day::of(date)) {
        Some(times) => times,
        None => return Vec::new(),
    };

    TIME_SLOTS
        .iter()
        .filter(|slot| offered.iter().any(|t| t == *slot))
        .map(|slot| slot.to_string())
        .collect()
}

/// Bookable times for an optional date, grouped into non-empty bands.
///
/// No date selected yields an empty result; callers render a placeholder.
pub fn available_slots(availability: &WeeklyAvailability, date: Option<NaiveDate>) -> Vec<BandSlots> {
    let Some(date) = date else {
        return Vec::new();
    };

    let times = bookable_times(availability, date);
    DayBand::ALL
        .into_iter()
        .filter_map(|band| {
            let in_band: Vec<String> = times
                .iter()
                .filter(|t| DayBand::of(t) == Some(band))
                .cloned()
                .collect();
            (!in_band.is_empty()).then_some(BandSlots {
                band,
                times: in_band,
            })
        })
        .collect()
}

/// Date/time picked by a student for one booking attempt.
///
/// The selected time is always one that was bookable on the selected date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSelection {
    date: Option<NaiveDate>,
    time: Option<String>,
}

impl SlotSelection {
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    /// Selects a date. Any previously selected time is cleared.
    pub fn select_date(&mut self, date: NaiveDate) {
        self.date = Some(date);
        self.time = None;
    }

    /// Selects a time bookable on the currently selected date.
    pub fn select_time(
        &mut self,
        availability: &WeeklyAvailability,
        time: &str,
    ) -> Result<(), BookingError> {
        let date = self.date.ok_or(BookingError::DateNotSelected)?;
        if !bookable_times(availability, date).iter().any(|t| t == time) {
            return Err(BookingError::SlotUnavailable {
                date,
                time: time.to_string(),
            });
        }
        self.time = Some(time.to_string());
        Ok(())
    }

    /// Both halves, if complete.
    pub fn complete(&self) -> Option<(NaiveDate, &str)> {
        Some((self.date?, self.time.as_deref()?))
    }
}

/// Toggles one slot on a day in an availability editor. Days stay sorted.
pub fn toggle_slot(
    availability: &mut WeeklyAvailability,
    day: Day,
    time: &str,
) -> Result<bool, BookingError> {
    if !is_master_slot(time) {
        return Err(BookingError::UnknownSlot(time.to_string()));
    }

    let slots = availability.entry(day).or_default();
    if let Some(pos) = slots.iter().position(|t| t == time) {
        slots.remove(pos);
        Ok(false)
    } else {
        slots.push(time.to_string());
        slots.sort();
        Ok(true)
    }
}

/// Empties every day of the week.
pub fn clear_all(availability: &mut WeeklyAvailability) {
    availability.clear();
    for day in Day::ALL {
        availability.insert(day, Vec::new());
    }
}
