/// Domain records for the marketplace
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Role discriminant, used where only the kind of account matters (signup, guards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Student,
    Teacher,
    Admin,
}

/// Fields shared by every account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Gamification counters shown on the student dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentProgress {
    pub points: u32,
    pub streak: u32,
    pub badges: Vec<String>,
}

/// An authenticated account. Role-specific data only exists on its variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum User {
    Student {
        #[serde(flatten)]
        profile: UserProfile,
        balance: u32,
        #[serde(flatten)]
        progress: StudentProgress,
    },
    Teacher {
        #[serde(flatten)]
        profile: UserProfile,
        /// Id of the teacher record in the marketplace collection.
        teacher_id: String,
        balance: u32,
        pending_balance: u32,
    },
    Admin {
        #[serde(flatten)]
        profile: UserProfile,
    },
}

impl User {
    pub fn profile(&self) -> &UserProfile {
        match self {
            User::Student { profile, .. }
            | User::Teacher { profile, .. }
            | User::Admin { profile } => profile,
        }
    }

    pub fn id(&self) -> &str {
        &self.profile().id
    }

    pub fn name(&self) -> &str {
        &self.profile().name
    }

    pub fn role(&self) -> UserRole {
        match self {
            User::Student { .. } => UserRole::Student,
            User::Teacher { .. } => UserRole::Teacher,
            User::Admin { .. } => UserRole::Admin,
        }
    }

    /// Teacher record id, when this account is a teacher.
    pub fn teacher_id(&self) -> Option<&str> {
        match self {
            User::Teacher { teacher_id, .. } => Some(teacher_id),
            _ => None,
        }
    }
}

/// Canonical day names used as keys of a teacher's weekly availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Resolves the day name of a calendar date.
    pub fn of(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self::from(date.weekday())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }
}

impl From<Weekday> for Day {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => Day::Monday,
            Weekday::Tue => Day::Tuesday,
            Weekday::Wed => Day::Wednesday,
            Weekday::Thu => Day::Thursday,
            Weekday::Fri => Day::Friday,
            Weekday::Sat => Day::Saturday,
            Weekday::Sun => Day::Sunday,
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Day::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown day name: {s}"))
    }
}

/// Day name -> ordered list of "HH:MM" start times.
pub type WeeklyAvailability = BTreeMap<Day, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    NotStarted,
    Pending,
    Verified,
    Rejected,
}

/// Current verification status plus the reason of the last rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationState {
    pub status: VerificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl VerificationState {
    pub fn new(status: VerificationStatus) -> Self {
        Self {
            status,
            reason: None,
        }
    }
}

impl Default for VerificationState {
    fn default() -> Self {
        Self::new(VerificationStatus::NotStarted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub student_name: String,
    pub rating: u8,
    pub comment: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub subjects: Vec<String>,
    pub grades: Vec<String>,
    pub hourly_rate: u32,
    pub bio: String,
    pub rating: f64,
    pub reviews_count: usize,
    pub is_online: bool,
    pub verified: bool,
    pub verification: VerificationState,
    pub qualifications: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub balance: u32,
    pub availability: WeeklyAvailability,
    /// Newest first.
    pub reviews: Vec<Review>,
}

impl Teacher {
    pub fn id(&self) -> &str {
        &self.profile.id
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    /// Availability for one day; an absent day is empty.
    pub fn slots_on(&self, day: Day) -> &[String] {
        self.availability
            .get(&day)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Upcoming,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Payfast,
    Ozow,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Payfast => "payfast",
            PaymentMethod::Ozow => "ozow",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub teacher_id: String,
    pub student_id: String,
    pub teacher_name: String,
    pub student_name: String,
    pub subject: String,
    pub date: NaiveDate,
    pub time: String,
    /// Hours.
    pub duration: u32,
    pub tutor_fee: u32,
    pub platform_fee: u32,
    pub total_paid: u32,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meet_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_given: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_of_date() {
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert_eq!(Day::of(monday), Day::Monday);
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
        assert_eq!(Day::of(sunday), Day::Sunday);
    }

    #[test]
    fn test_day_parse_is_case_insensitive() {
        assert_eq!("monday".parse::<Day>(), Ok(Day::Monday));
        assert!("Funday".parse::<Day>().is_err());
    }

    #[test]
    fn test_user_serializes_with_role_tag() {
        let user = User::Admin {
            profile: UserProfile {
                id: "admin1".to_string(),
                name: "Platform Admin".to_string(),
                email: "admin@tutorconnect.sa".to_string(),
                avatar: None,
            },
        };

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["role"], "ADMIN");
        assert_eq!(value["id"], "admin1");
        assert_eq!(user.role(), UserRole::Admin);
        assert!(user.teacher_id().is_none());
    }
}
