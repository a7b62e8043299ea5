//! Per-session view state: who is signed in, what is on screen, which modal is open.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::booking::{BookingError, BookingWizard};
use crate::model::{Booking, User, UserRole, WeeklyAvailability};

/// Screens a client can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    Home,
    Search,
    TeacherProfile,
    TeacherDashboard,
    StudentDashboard,
    AdminDashboard,
    Classroom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthPrompt {
    Login,
    Signup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    #[serde(skip)]
    shown_at: Instant,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Please log in to continue")]
    AuthRequired,

    #[error("This action requires a {0:?} account")]
    WrongRole(UserRole),

    #[error("Already signed in")]
    AlreadySignedIn,
}

/// Everything a client needs to render the current screen.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub view: View,
    pub profile_teacher_id: Option<String>,
    pub auth_prompt: Option<AuthPrompt>,
    pub booking: Option<BookingWizard>,
    pub active_booking_id: Option<String>,
    pub toast: Option<Toast>,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    user: Option<User>,
    view: View,
    profile_teacher_id: Option<String>,
    auth_prompt: Option<AuthPrompt>,
    /// Teacher the visitor tried to book before signing in
    pending_booking_teacher: Option<String>,
    booking: Option<BookingWizard>,
    active_booking_id: Option<String>,
    toast: Option<Toast>,
    toast_duration: Duration,
    /// Unsaved edits from the teacher availability editor
    availability_draft: Option<WeeklyAvailability>,
}

impl SessionState {
    pub fn new(toast_duration: Duration) -> Self {
        Self {
            user: None,
            view: View::Home,
            profile_teacher_id: None,
            auth_prompt: None,
            pending_booking_teacher: None,
            booking: None,
            active_booking_id: None,
            toast: None,
            toast_duration,
            availability_draft: None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn require_user(&self) -> Result<&User, SessionError> {
        self.user.as_ref().ok_or(SessionError::AuthRequired)
    }

    pub fn require_role(&self, role: UserRole) -> Result<&User, SessionError> {
        let user = self.require_user()?;
        if user.role() == role {
            Ok(user)
        } else {
            Err(SessionError::WrongRole(role))
        }
    }

    pub fn navigate(&mut self, view: View) {
        self.view = view;
    }

    /// The view that actually renders. Dashboards for another role fall back to home.
    pub fn resolved_view(&self) -> View {
        let role = self.user.as_ref().map(User::role);
        match self.view {
            View::TeacherDashboard if role != Some(UserRole::Teacher) => View::Home,
            View::StudentDashboard if role != Some(UserRole::Student) => View::Home,
            View::AdminDashboard if role != Some(UserRole::Admin) => View::Home,
            View::TeacherProfile if self.profile_teacher_id.is_none() => View::Search,
            View::Classroom if self.active_booking_id.is_none() => View::Home,
            view => view,
        }
    }

    /// Shows `message`, replacing whatever toast was visible.
    pub fn notify(&mut self, message: impl Into<String>, kind: ToastKind, now: Instant) {
        self.toast = Some(Toast {
            message: message.into(),
            kind,
            shown_at: now,
        });
    }

    /// The visible toast, if it has not expired by `now`.
    pub fn toast(&mut self, now: Instant) -> Option<&Toast> {
        let expired = self
            .toast
            .as_ref()
            .is_some_and(|t| now.saturating_duration_since(t.shown_at) >= self.toast_duration);
        if expired {
            self.toast = None;
        }
        self.toast.as_ref()
    }

    pub fn dismiss_toast(&mut self) {
        self.toast = None;
    }

    pub fn open_auth(&mut self, prompt: AuthPrompt) {
        self.auth_prompt = Some(prompt);
    }

    pub fn close_auth(&mut self) {
        self.auth_prompt = None;
        self.pending_booking_teacher = None;
    }

    /// Signs `user` in and routes to the screen their role starts on.
    ///
    /// A student who was stopped at the booking entry point gets the booking
    /// modal back instead of the dashboard.
    pub fn sign_in(&mut self, user: User) {
        self.auth_prompt = None;
        let pending = self.pending_booking_teacher.take();

        match user.role() {
            UserRole::Teacher => self.view = View::TeacherDashboard,
            UserRole::Admin => self.view = View::AdminDashboard,
            UserRole::Student => match pending {
                Some(teacher_id) => self.booking = Some(BookingWizard::open(teacher_id)),
                None => self.view = View::StudentDashboard,
            },
        }
        self.user = Some(user);
    }

    pub fn sign_out(&mut self, now: Instant) {
        self.user = None;
        self.booking = None;
        self.active_booking_id = None;
        self.pending_booking_teacher = None;
        self.availability_draft = None;
        self.view = View::Home;
        self.notify("You have been logged out safely.", ToastKind::Success, now);
    }

    pub fn view_profile(&mut self, teacher_id: impl Into<String>) {
        self.profile_teacher_id = Some(teacher_id.into());
        self.view = View::TeacherProfile;
    }

    /// Entry point of a booking. Without a signed-in user this opens the login
    /// prompt instead and remembers the teacher.
    pub fn request_booking(&mut self, teacher_id: &str) -> Result<&BookingWizard, SessionError> {
        match self.user.as_ref().map(User::role) {
            None => {
                self.pending_booking_teacher = Some(teacher_id.to_string());
                self.open_auth(AuthPrompt::Login);
                Err(SessionError::AuthRequired)
            }
            Some(UserRole::Student) => Ok(self.booking.insert(BookingWizard::open(teacher_id))),
            Some(_) => Err(SessionError::WrongRole(UserRole::Student)),
        }
    }

    pub fn booking(&self) -> Option<&BookingWizard> {
        self.booking.as_ref()
    }

    pub fn booking_mut(&mut self) -> Result<&mut BookingWizard, BookingError> {
        self.booking.as_mut().ok_or(BookingError::NotOpen)
    }

    pub fn close_booking(&mut self) {
        self.booking = None;
    }

    /// Closes the modal after `booking` was stored and routes to the dashboard.
    pub fn booking_confirmed(&mut self, booking: &Booking, now: Instant) {
        self.booking = None;
        self.view = View::StudentDashboard;
        self.notify(
            format!(
                "Lesson with {} successfully booked for {} at {}!",
                booking.teacher_name,
                booking.date.format("%-d %B %Y"),
                booking.time
            ),
            ToastKind::Success,
            now,
        );
    }

    pub fn join_classroom(&mut self, booking_id: impl Into<String>) {
        self.active_booking_id = Some(booking_id.into());
        self.view = View::Classroom;
    }

    pub fn leave_classroom(&mut self) {
        self.active_booking_id = None;
        self.view = match self.user.as_ref().map(User::role) {
            Some(UserRole::Teacher) => View::TeacherDashboard,
            _ => View::StudentDashboard,
        };
    }

    /// The editor's working copy, started from `saved` on first use.
    pub fn availability_draft(
        &mut self,
        saved: impl FnOnce() -> WeeklyAvailability,
    ) -> &mut WeeklyAvailability {
        self.availability_draft.get_or_insert_with(saved)
    }

    pub fn take_availability_draft(&mut self) -> Option<WeeklyAvailability> {
        self.availability_draft.take()
    }

    pub fn snapshot(&mut self, now: Instant) -> SessionSnapshot {
        let toast = self.toast(now).cloned();
        SessionSnapshot {
            user: self.user.clone(),
            view: self.resolved_view(),
            profile_teacher_id: self.profile_teacher_id.clone(),
            auth_prompt: self.auth_prompt,
            booking: self.booking.clone(),
            active_booking_id: self.active_booking_id.clone(),
            toast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::WizardStep;
    use crate::model::UserProfile;

    fn profile(id: &str) -> UserProfile {
        UserProfile {
            id: id.to_string(),
            name: "Student User".to_string(),
            email: format!("{id}@tutorconnect.sa"),
            avatar: None,
        }
    }

    fn student() -> User {
        User::Student {
            profile: profile("s1"),
            balance: 5,
            progress: Default::default(),
        }
    }

    fn teacher() -> User {
        User::Teacher {
            profile: profile("t1"),
            teacher_id: "t1".to_string(),
            balance: 4500,
            pending_balance: 0,
        }
    }

    fn session() -> SessionState {
        SessionState::new(Duration::from_secs(5))
    }

    #[test]
    fn test_only_one_toast_is_visible() {
        let now = Instant::now();
        let mut session = session();
        session.notify("first", ToastKind::Success, now);
        session.notify("second", ToastKind::Error, now);

        let toast = session.toast(now).unwrap();
        assert_eq!(toast.message, "second");
        assert_eq!(toast.kind, ToastKind::Error);
    }

    #[test]
    fn test_toast_expires() {
        let now = Instant::now();
        let mut session = session();
        session.notify("hello", ToastKind::Success, now);

        assert!(session.toast(now + Duration::from_secs(4)).is_some());
        assert!(session.toast(now + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn test_replacing_a_toast_restarts_its_timer() {
        let now = Instant::now();
        let mut session = session();
        session.notify("first", ToastKind::Success, now);
        session.notify("second", ToastKind::Success, now + Duration::from_secs(4));

        let later = now + Duration::from_secs(6);
        assert_eq!(session.toast(later).unwrap().message, "second");
    }

    #[test]
    fn test_booking_without_user_opens_login() {
        let mut session = session();
        assert_eq!(
            session.request_booking("t1").err(),
            Some(SessionError::AuthRequired)
        );
        assert!(session.booking().is_none());

        let snapshot = session.snapshot(Instant::now());
        assert_eq!(snapshot.auth_prompt, Some(AuthPrompt::Login));

        session.sign_in(student());
        let wizard = session.booking().unwrap();
        assert_eq!(wizard.teacher_id(), "t1");
        assert_eq!(wizard.step(), WizardStep::SelectSlot);
    }

    #[test]
    fn test_teachers_cannot_book() {
        let mut session = session();
        session.sign_in(teacher());
        assert_eq!(
            session.request_booking("t2").err(),
            Some(SessionError::WrongRole(UserRole::Student))
        );
    }

    #[test]
    fn test_new_booking_resets_wizard() {
        let mut session = session();
        session.sign_in(student());
        session.request_booking("t1").unwrap();
        session
            .booking_mut()
            .unwrap()
            .select_date(chrono::NaiveDate::from_ymd_opt(2024, 6, 3).unwrap())
            .unwrap();

        let wizard = session.request_booking("t1").unwrap();
        assert_eq!(wizard.selection().date(), None);
    }

    #[test]
    fn test_sign_in_routes_by_role() {
        let mut session = session();
        session.sign_in(teacher());
        assert_eq!(session.resolved_view(), View::TeacherDashboard);

        let mut session = self::session();
        session.sign_in(student());
        assert_eq!(session.resolved_view(), View::StudentDashboard);
    }

    #[test]
    fn test_dashboard_for_other_role_falls_back_home() {
        let mut session = session();
        session.sign_in(student());
        session.navigate(View::TeacherDashboard);
        assert_eq!(session.resolved_view(), View::Home);

        session.navigate(View::AdminDashboard);
        assert_eq!(session.resolved_view(), View::Home);
    }

    #[test]
    fn test_sign_out_goes_home_with_toast() {
        let now = Instant::now();
        let mut session = session();
        session.sign_in(student());
        session.sign_out(now);

        assert!(session.user().is_none());
        assert_eq!(session.resolved_view(), View::Home);
        assert_eq!(
            session.toast(now).unwrap().message,
            "You have been logged out safely."
        );
    }

    #[test]
    fn test_availability_draft_starts_from_saved_copy() {
        use crate::model::Day;

        let mut session = session();
        session.sign_in(teacher());
        session
            .availability_draft(|| {
                let mut saved = WeeklyAvailability::new();
                saved.insert(Day::Monday, vec!["14:00".to_string()]);
                saved
            })
            .entry(Day::Monday)
            .or_default()
            .push("15:00".to_string());

        // Later calls keep the edits
        let draft = session.availability_draft(WeeklyAvailability::new);
        assert_eq!(draft[&Day::Monday], ["14:00", "15:00"]);

        assert!(session.take_availability_draft().is_some());
        assert!(session.take_availability_draft().is_none());
    }

    #[test]
    fn test_leaving_classroom_returns_to_dashboard() {
        let mut session = session();
        session.sign_in(teacher());
        session.join_classroom("b1");
        assert_eq!(session.resolved_view(), View::Classroom);

        session.leave_classroom();
        assert_eq!(session.resolved_view(), View::TeacherDashboard);
    }
}
