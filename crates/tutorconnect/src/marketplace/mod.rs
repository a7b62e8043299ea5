//! The shared teacher and booking collections and every mutation applied to them.
//!
//! Each collection sits behind its own lock as an `Arc<Vec<_>>`. Readers clone
//! the `Arc` and never block writers for long. A mutation clones the vector,
//! edits the copy, and swaps it in only when the whole change succeeded, so a
//! failed mutation leaves the collection untouched.

pub mod dashboard;
mod error;
pub mod search;

pub use dashboard::{StudentDashboard, TeacherDashboard};
pub use error::MarketplaceError;
pub use search::TutorQuery;

use chrono::{NaiveDate, Utc};
use rand::Rng;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

use crate::booking::{self, BandSlots, BookingRequest, FeeBreakdown, LESSON_DURATION_HOURS};
use crate::model::{
    Booking, BookingStatus, Review, Teacher, User, UserProfile, VerificationState,
    VerificationStatus, WeeklyAvailability,
};
use crate::reviews;
use crate::seed;
use crate::verification::{self, LookupOutcome, VerificationOverride, VerificationSubmission};

/// Subject recorded on a booking whose teacher lists no subjects.
pub const FALLBACK_SUBJECT: &str = "General Tutoring";

type Result<T> = std::result::Result<T, MarketplaceError>;

/// Generates a record id: `prefix` + timestamp + random suffix, all hex.
pub fn generate_id(prefix: &str) -> String {
    let timestamp = Utc::now().timestamp_micros();
    let random: u16 = rand::thread_rng().gen();
    format!("{}{:x}{:04x}", prefix, timestamp, random)
}

fn snapshot<T>(lock: &RwLock<Arc<Vec<T>>>) -> Arc<Vec<T>> {
    lock.read().unwrap_or_else(PoisonError::into_inner).clone()
}

/// Applies `f` to a copy of the collection and publishes it if `f` succeeds.
fn update<T, R>(
    lock: &RwLock<Arc<Vec<T>>>,
    f: impl FnOnce(&mut Vec<T>) -> Result<R>,
) -> Result<R>
where
    T: Clone,
{
    let mut current = lock.write().unwrap_or_else(PoisonError::into_inner);
    let mut next = current.as_ref().clone();
    let out = f(&mut next)?;
    *current = Arc::new(next);
    Ok(out)
}

fn find_teacher<'a>(teachers: &'a mut [Teacher], id: &str) -> Result<&'a mut Teacher> {
    teachers
        .iter_mut()
        .find(|t| t.id() == id)
        .ok_or_else(|| MarketplaceError::TeacherNotFound(id.to_string()))
}

pub struct Marketplace {
    teachers: RwLock<Arc<Vec<Teacher>>>,
    /// Newest first
    bookings: RwLock<Arc<Vec<Booking>>>,
    default_hourly_rate: u32,
}

impl Marketplace {
    pub fn new(teachers: Vec<Teacher>, bookings: Vec<Booking>, default_hourly_rate: u32) -> Self {
        Self {
            teachers: RwLock::new(Arc::new(teachers)),
            bookings: RwLock::new(Arc::new(bookings)),
            default_hourly_rate,
        }
    }

    /// The demo catalogue with bookings placed around `today`.
    pub fn seeded(today: NaiveDate, default_hourly_rate: u32) -> Self {
        Self::new(seed::teachers(), seed::bookings(today), default_hourly_rate)
    }

    pub fn teachers(&self) -> Arc<Vec<Teacher>> {
        snapshot(&self.teachers)
    }

    pub fn bookings(&self) -> Arc<Vec<Booking>> {
        snapshot(&self.bookings)
    }

    pub fn teacher(&self, id: &str) -> Result<Teacher> {
        self.teachers()
            .iter()
            .find(|t| t.id() == id)
            .cloned()
            .ok_or_else(|| MarketplaceError::TeacherNotFound(id.to_string()))
    }

    pub fn booking(&self, id: &str) -> Result<Booking> {
        self.bookings()
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| MarketplaceError::BookingNotFound(id.to_string()))
    }

    pub fn search(&self, query: &TutorQuery) -> Vec<Teacher> {
        self.teachers()
            .iter()
            .filter(|t| query.matches(t))
            .cloned()
            .collect()
    }

    /// Bookable slots of a teacher on `date`, grouped by band.
    pub fn slots(&self, teacher_id: &str, date: Option<NaiveDate>) -> Result<Vec<BandSlots>> {
        let teacher = self.teacher(teacher_id)?;
        Ok(booking::available_slots(&teacher.availability, date))
    }

    /// Stores a paid booking at the head of the collection.
    ///
    /// The slot is checked again against the teacher's current availability.
    pub fn confirm_booking(&self, student: &User, request: &BookingRequest) -> Result<Booking> {
        let User::Student { profile, .. } = student else {
            return Err(booking::BookingError::NotAStudent.into());
        };
        let teacher = self.teacher(&request.teacher_id)?;

        if !booking::bookable_times(&teacher.availability, request.date)
            .iter()
            .any(|t| *t == request.time)
        {
            return Err(booking::BookingError::SlotUnavailable {
                date: request.date,
                time: request.time.clone(),
            }
            .into());
        }

        let fees = FeeBreakdown::for_lesson(teacher.hourly_rate);
        let id = generate_id("b");
        let record = Booking {
            meet_link: Some(format!("room-{}", id)),
            id,
            teacher_id: teacher.id().to_string(),
            student_id: profile.id.clone(),
            teacher_name: teacher.name().to_string(),
            student_name: profile.name.clone(),
            subject: teacher
                .subjects
                .first()
                .cloned()
                .unwrap_or_else(|| FALLBACK_SUBJECT.to_string()),
            date: request.date,
            time: request.time.clone(),
            duration: LESSON_DURATION_HOURS,
            tutor_fee: fees.tutor_fee,
            platform_fee: fees.platform_fee,
            total_paid: fees.total,
            status: BookingStatus::Upcoming,
            payment_method: Some(request.method),
            feedback_given: None,
        };

        update(&self.bookings, |bookings| {
            bookings.insert(0, record.clone());
            Ok(())
        })?;

        info!(
            booking_id = %record.id,
            teacher_id = %record.teacher_id,
            student_id = %record.student_id,
            total = record.total_paid,
            "Booking confirmed"
        );
        Ok(record)
    }

    /// Posts a review and recomputes the teacher's rating.
    pub fn add_review(
        &self,
        user: Option<&User>,
        teacher_id: &str,
        rating: u8,
        comment: &str,
        today: NaiveDate,
    ) -> Result<Teacher> {
        reviews::validate_submission(user, rating, comment)?;
        let Some(user) = user else {
            return Err(reviews::ReviewError::NotAuthenticated.into());
        };

        let review = Review {
            id: generate_id("r"),
            student_name: user.name().to_string(),
            rating,
            comment: comment.trim().to_string(),
            date: today.format("%Y-%m-%d").to_string(),
        };

        let updated = update(&self.teachers, |teachers| {
            let teacher = find_teacher(teachers, teacher_id)?;
            *teacher = reviews::apply_review(teacher, review);
            Ok(teacher.clone())
        })?;

        info!(
            teacher_id,
            rating = updated.rating,
            reviews_count = updated.reviews_count,
            "Review posted"
        );
        Ok(updated)
    }

    /// Moves a teacher's verification to pending before the registry lookup.
    pub fn begin_verification(
        &self,
        teacher_id: &str,
        submission: &VerificationSubmission,
    ) -> Result<VerificationState> {
        verification::validate_submission(submission)?;
        update(&self.teachers, |teachers| {
            let teacher = find_teacher(teachers, teacher_id)?;
            let next = verification::begin_submission(&teacher.verification)?;
            set_verification(teacher, next.clone());
            Ok(next)
        })
    }

    /// Applies a completed registry lookup to a pending verification.
    pub fn complete_verification(
        &self,
        teacher_id: &str,
        outcome: &LookupOutcome,
    ) -> Result<VerificationState> {
        let next = update(&self.teachers, |teachers| {
            let teacher = find_teacher(teachers, teacher_id)?;
            let next = verification::resolve(&teacher.verification, outcome)?;
            set_verification(teacher, next.clone());
            Ok(next)
        })?;

        info!(teacher_id, status = ?next.status, "Verification resolved");
        Ok(next)
    }

    /// Puts a pending verification back to `previous` after a lookup that
    /// never completed, so the teacher can submit again.
    pub fn withdraw_verification(
        &self,
        teacher_id: &str,
        previous: &VerificationState,
    ) -> Result<VerificationState> {
        let restored = update(&self.teachers, |teachers| {
            let teacher = find_teacher(teachers, teacher_id)?;
            let restored = verification::withdraw(&teacher.verification, previous)?;
            set_verification(teacher, restored.clone());
            Ok(restored)
        })?;

        warn!(teacher_id, status = ?restored.status, "Verification withdrawn");
        Ok(restored)
    }

    /// Admin decision that bypasses the registry lookup.
    pub fn override_verification(
        &self,
        admin: &User,
        teacher_id: &str,
        target: VerificationStatus,
    ) -> Result<VerificationOverride> {
        if !matches!(admin, User::Admin { .. }) {
            return Err(MarketplaceError::Forbidden(
                "Only platform admins can override verification",
            ));
        }
        let next = verification::override_status(target)?;

        let previous = update(&self.teachers, |teachers| {
            let teacher = find_teacher(teachers, teacher_id)?;
            let previous = teacher.verification.status;
            set_verification(teacher, next);
            Ok(previous)
        })?;

        let record = VerificationOverride {
            admin_id: admin.id().to_string(),
            teacher_id: teacher_id.to_string(),
            previous,
            status: target,
            at: Utc::now(),
        };
        info!(
            target: "audit",
            admin_id = %record.admin_id,
            teacher_id = %record.teacher_id,
            previous = ?record.previous,
            status = ?record.status,
            at = %record.at,
            "Verification overridden"
        );
        Ok(record)
    }

    /// Replaces a teacher's weekly availability. Every time must be a bookable slot.
    pub fn set_availability(
        &self,
        teacher_id: &str,
        availability: WeeklyAvailability,
    ) -> Result<Teacher> {
        let mut cleaned = WeeklyAvailability::new();
        for (day, times) in availability {
            let mut times: Vec<String> = times.into_iter().map(|t| t.trim().to_string()).collect();
            if let Some(bad) = times.iter().find(|t| !booking::is_master_slot(t)) {
                return Err(booking::BookingError::UnknownSlot(bad.clone()).into());
            }
            times.sort();
            times.dedup();
            cleaned.insert(day, times);
        }

        let updated = update(&self.teachers, |teachers| {
            let teacher = find_teacher(teachers, teacher_id)?;
            teacher.availability = cleaned;
            Ok(teacher.clone())
        })?;

        info!(teacher_id, "Availability saved");
        Ok(updated)
    }

    /// Creates the catalogue record for a teacher who just signed up.
    pub fn register_teacher(&self, profile: UserProfile) -> Result<Teacher> {
        let teacher = Teacher {
            profile,
            subjects: Vec::new(),
            grades: Vec::new(),
            hourly_rate: self.default_hourly_rate,
            bio: String::new(),
            rating: 0.0,
            reviews_count: 0,
            is_online: false,
            verified: false,
            verification: VerificationState::default(),
            qualifications: Vec::new(),
            requirements: Vec::new(),
            video_url: None,
            balance: 0,
            availability: WeeklyAvailability::new(),
            reviews: Vec::new(),
        };

        update(&self.teachers, |teachers| {
            if teachers.iter().any(|t| t.id() == teacher.id()) {
                warn!(teacher_id = %teacher.id(), "Teacher id already registered");
                return Err(MarketplaceError::Forbidden("Teacher already registered"));
            }
            teachers.push(teacher.clone());
            Ok(())
        })?;

        info!(teacher_id = %teacher.id(), "Teacher registered");
        Ok(teacher)
    }

    pub fn student_dashboard(&self, user: &User) -> Result<StudentDashboard> {
        dashboard::student_dashboard(&self.bookings(), user)
            .ok_or(MarketplaceError::Forbidden("Only students have a student dashboard"))
    }

    pub fn teacher_dashboard(&self, user: &User) -> Result<TeacherDashboard> {
        let User::Teacher {
            teacher_id,
            pending_balance,
            ..
        } = user
        else {
            return Err(MarketplaceError::Forbidden(
                "Only teachers have a teacher dashboard",
            ));
        };
        let teacher = self.teacher(teacher_id)?;
        Ok(dashboard::teacher_dashboard(
            &self.bookings(),
            &teacher,
            *pending_balance,
        ))
    }

    /// Teachers for the admin review list. `None` lists every teacher.
    pub fn teachers_by_status(&self, status: Option<VerificationStatus>) -> Vec<Teacher> {
        dashboard::filter_by_status(&self.teachers(), status)
    }
}

fn set_verification(teacher: &mut Teacher, state: VerificationState) {
    teacher.verified = state.status == VerificationStatus::Verified;
    teacher.verification = state;
}
