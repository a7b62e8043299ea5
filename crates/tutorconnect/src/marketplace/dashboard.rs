//! Read models for the student, teacher, and admin dashboards.

use serde::Serialize;

use crate::model::{
    Booking, BookingStatus, StudentProgress, Teacher, User, VerificationState, VerificationStatus,
    WeeklyAvailability,
};

/// Number of completed lessons shown in the student's history.
const STUDENT_HISTORY_LEN: usize = 3;
/// Number of completed lessons shown in the teacher's activity list.
const TEACHER_ACTIVITY_LEN: usize = 4;

#[derive(Debug, Clone, Serialize)]
pub struct StudentDashboard {
    pub next_lesson: Option<Booking>,
    /// Soonest first
    pub upcoming: Vec<Booking>,
    /// Most recent first
    pub history: Vec<Booking>,
    pub balance: u32,
    #[serde(flatten)]
    pub progress: StudentProgress,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeacherDashboard {
    /// Soonest first
    pub upcoming: Vec<Booking>,
    pub recent_completed: Vec<Booking>,
    pub balance: u32,
    pub pending_balance: u32,
    pub availability: WeeklyAvailability,
    pub verification: VerificationState,
}

/// Admin filter over verification status; `None` lists everyone.
pub fn filter_by_status(teachers: &[Teacher], status: Option<VerificationStatus>) -> Vec<Teacher> {
    teachers
        .iter()
        .filter(|t| status.map_or(true, |s| t.verification.status == s))
        .cloned()
        .collect()
}

fn with_status<'a>(
    bookings: &'a [Booking],
    status: BookingStatus,
    owned_by: impl Fn(&Booking) -> bool + 'a,
) -> impl Iterator<Item = &'a Booking> + 'a {
    bookings
        .iter()
        .filter(move |b| b.status == status && owned_by(b))
}

fn soonest_first(mut bookings: Vec<Booking>) -> Vec<Booking> {
    bookings.sort_by(|a, b| (a.date, &a.time).cmp(&(b.date, &b.time)));
    bookings
}

/// Builds the student dashboard. `bookings` is the collection, newest first.
pub fn student_dashboard(bookings: &[Booking], student: &User) -> Option<StudentDashboard> {
    let User::Student {
        profile,
        balance,
        progress,
    } = student
    else {
        return None;
    };

    let upcoming = soonest_first(
        with_status(bookings, BookingStatus::Upcoming, |b| b.student_id == profile.id)
            .cloned()
            .collect(),
    );
    let history = with_status(bookings, BookingStatus::Completed, |b| {
        b.student_id == profile.id
    })
    .take(STUDENT_HISTORY_LEN)
    .cloned()
    .collect();

    Some(StudentDashboard {
        next_lesson: upcoming.first().cloned(),
        upcoming,
        history,
        balance: *balance,
        progress: progress.clone(),
    })
}

/// Builds the teacher dashboard from the teacher's record and the bookings.
pub fn teacher_dashboard(
    bookings: &[Booking],
    teacher: &Teacher,
    pending_balance: u32,
) -> TeacherDashboard {
    let id = teacher.id();
    let upcoming = soonest_first(
        with_status(bookings, BookingStatus::Upcoming, |b| b.teacher_id == id)
            .cloned()
            .collect(),
    );
    let recent_completed = with_status(bookings, BookingStatus::Completed, |b| b.teacher_id == id)
        .take(TEACHER_ACTIVITY_LEN)
        .cloned()
        .collect();

    TeacherDashboard {
        upcoming,
        recent_completed,
        balance: teacher.balance,
        pending_balance,
        availability: teacher.availability.clone(),
        verification: teacher.verification.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserProfile;
    use crate::seed;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn student(id: &str) -> User {
        User::Student {
            profile: UserProfile {
                id: id.to_string(),
                name: "Student User".to_string(),
                email: "student@tutorconnect.sa".to_string(),
                avatar: None,
            },
            balance: 5,
            progress: StudentProgress {
                points: 1240,
                streak: 12,
                badges: vec!["Maths Whiz".to_string()],
            },
        }
    }

    #[test]
    fn test_student_dashboard_splits_upcoming_and_history() {
        let bookings = seed::bookings(today());
        let dashboard = student_dashboard(&bookings, &student("s1")).unwrap();

        assert_eq!(dashboard.next_lesson.as_ref().map(|b| b.id.as_str()), Some("b1"));
        assert_eq!(dashboard.upcoming.len(), 1);
        assert_eq!(dashboard.history.len(), 1);
        assert_eq!(dashboard.history[0].id, "b2");
        assert_eq!(dashboard.progress.points, 1240);
    }

    #[test]
    fn test_student_dashboard_only_shows_own_bookings() {
        let bookings = seed::bookings(today());
        let dashboard = student_dashboard(&bookings, &student("s2")).unwrap();
        assert!(dashboard.next_lesson.is_none());
        assert!(dashboard.history.is_empty());
    }

    #[test]
    fn test_next_lesson_is_the_soonest() {
        let mut bookings = seed::bookings(today());
        let mut later = bookings[0].clone();
        later.id = "b9".to_string();
        later.date = today().succ_opt().unwrap();
        bookings.insert(0, later);

        let dashboard = student_dashboard(&bookings, &student("s1")).unwrap();
        assert_eq!(dashboard.next_lesson.unwrap().id, "b1");
    }

    #[test]
    fn test_teacher_dashboard() {
        let bookings = seed::bookings(today());
        let teachers = seed::teachers();
        let dashboard = teacher_dashboard(&bookings, &teachers[0], 0);

        assert_eq!(dashboard.upcoming.len(), 1);
        assert!(dashboard.recent_completed.is_empty());
        assert_eq!(dashboard.balance, 4500);
    }

    #[test]
    fn test_filter_by_status() {
        let mut teachers = seed::teachers();
        teachers[1].verification = VerificationState::new(VerificationStatus::Pending);

        let pending = filter_by_status(&teachers, Some(VerificationStatus::Pending));
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id(), "t2");
        assert_eq!(filter_by_status(&teachers, None).len(), 4);
    }
}
