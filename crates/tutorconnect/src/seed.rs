//! Fixed seed data standing in for a database.

use chrono::{Duration, NaiveDate};

use crate::model::{
    Booking, BookingStatus, Day, Review, Teacher, UserProfile, VerificationState,
    VerificationStatus, WeeklyAvailability,
};

pub const SUBJECTS: [&str; 9] = [
    "Mathematics",
    "Physical Sciences",
    "Accounting",
    "English Home Language",
    "Afrikaans EAT",
    "Geography",
    "Life Sciences",
    "History",
    "Coding & IT",
];

pub const GRADES: [&str; 5] = [
    "Grade 8",
    "Grade 9",
    "Grade 10",
    "Grade 11",
    "Matric (Grade 12)",
];

/// Password accepted for every demo account.
pub const DEMO_PASSWORD: &str = "password";
pub const ADMIN_EMAIL: &str = "admin@tutorconnect.sa";
pub const STUDENT_EMAIL: &str = "student@tutorconnect.sa";

/// Seeded teachers, each of whom can sign in with [`DEMO_PASSWORD`].
pub const DEMO_TEACHER_IDS: [&str; 4] = ["t1", "t2", "t3", "t4"];

pub fn is_demo_teacher(teacher_id: &str) -> bool {
    DEMO_TEACHER_IDS.contains(&teacher_id)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn availability(days: &[(Day, &[&str])]) -> WeeklyAvailability {
    days.iter()
        .map(|(day, times)| (*day, strings(times)))
        .collect()
}

fn review(id: &str, student: &str, rating: u8, comment: &str, date: &str) -> Review {
    Review {
        id: id.to_string(),
        student_name: student.to_string(),
        rating,
        comment: comment.to_string(),
        date: date.to_string(),
    }
}

fn profile(id: &str, name: &str, email: &str, avatar: &str) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        avatar: Some(avatar.to_string()),
    }
}

const INTRO_VIDEO: &str = "https://www.youtube.com/embed/dQw4w9WgXcQ";

pub fn teachers() -> Vec<Teacher> {
    vec![
        Teacher {
            profile: profile(
                "t1",
                "Thandi Nkosi",
                "thandi@tutorconnect.sa",
                "https://picsum.photos/id/1011/200/200",
            ),
            subjects: strings(&["Mathematics", "Physical Sciences"]),
            grades: strings(&["Grade 10", "Grade 11", "Matric (Grade 12)"]),
            hourly_rate: 250,
            bio: "Experienced Matric Maths teacher with a 98% pass rate history. I make complex algebra simple and help students visualize geometry problems.".to_string(),
            rating: 4.9,
            reviews_count: 124,
            is_online: true,
            verified: true,
            verification: VerificationState::new(VerificationStatus::Verified),
            qualifications: strings(&[
                "B.Ed Mathematics & Science (Wits University)",
                "Honours in Mathematics Education",
                "SACE Registered Educator",
            ]),
            requirements: strings(&[
                "Stable Fiber Internet (10Mbps+)",
                "Wacom Graphic Tablet / Stylus for Whiteboard",
                "Noise-cancelling Headset",
                "HD Webcam",
                "Quiet Environment",
            ]),
            video_url: Some(INTRO_VIDEO.to_string()),
            balance: 4500,
            availability: availability(&[
                (Day::Monday, &["14:00", "15:00", "16:00"]),
                (Day::Tuesday, &["15:00", "16:00"]),
                (Day::Wednesday, &["14:00", "16:00", "17:00"]),
                (Day::Thursday, &["15:00", "17:00"]),
                (Day::Friday, &["14:00", "15:00"]),
            ]),
            reviews: vec![
                review("r1", "Sipho M.", 5, "Ma'am Thandi is the best! My marks went from 40% to 75%.", "2023-10-15"),
                review("r2", "Jessica L.", 5, "Very patient and explains clearly.", "2023-09-22"),
            ],
        },
        Teacher {
            profile: profile(
                "t2",
                "Johan Van Der Merwe",
                "johan@tutorconnect.sa",
                "https://picsum.photos/id/1005/200/200",
            ),
            subjects: strings(&["Accounting", "Afrikaans EAT"]),
            grades: strings(&["Grade 8", "Grade 9", "Grade 10"]),
            hourly_rate: 200,
            bio: "Patient tutor specializing in building strong foundations in Accounting and Afrikaans. I focus on understanding the \"why\" behind the numbers.".to_string(),
            rating: 4.7,
            reviews_count: 89,
            is_online: false,
            verified: true,
            verification: VerificationState::new(VerificationStatus::Verified),
            qualifications: strings(&[
                "B.Com Accounting (Stellenbosch)",
                "PGCE (UNISA)",
                "TEFL Certified",
            ]),
            requirements: strings(&[
                "Stable Internet Connection",
                "Noise-cancelling Mic",
                "Desktop/Laptop (No tablets for sharing spreadsheets)",
            ]),
            video_url: Some(INTRO_VIDEO.to_string()),
            balance: 3200,
            availability: availability(&[
                (Day::Monday, &["15:00", "16:00", "17:00"]),
                (Day::Wednesday, &["15:00", "16:00"]),
                (Day::Friday, &["14:00", "15:00", "16:00"]),
            ]),
            reviews: vec![
                review("r3", "Michael B.", 4, "Great accounting help, really understands the syllabus.", "2023-10-01"),
                review("r4", "Lerato K.", 5, "My Afrikaans has improved so much!", "2023-09-10"),
            ],
        },
        Teacher {
            profile: profile(
                "t3",
                "Simphiwe Zulu",
                "simphiwe@tutorconnect.sa",
                "https://picsum.photos/id/1027/200/200",
            ),
            subjects: strings(&["English Home Language", "History"]),
            grades: strings(&["Grade 11", "Matric (Grade 12)"]),
            hourly_rate: 180,
            bio: "Passionate about literature and essay writing skills. Let us ace that English paper! I also help with history source-based questions.".to_string(),
            rating: 4.8,
            reviews_count: 56,
            is_online: true,
            verified: true,
            verification: VerificationState::new(VerificationStatus::Verified),
            qualifications: strings(&[
                "BA English Literature (UCT)",
                "Masters in History",
                "SACE Registered",
            ]),
            requirements: strings(&["Stable Fiber Internet", "HD Camera", "Quiet Room"]),
            video_url: Some(INTRO_VIDEO.to_string()),
            balance: 1500,
            availability: availability(&[
                (Day::Tuesday, &["14:00", "15:00", "16:00", "17:00"]),
                (Day::Thursday, &["14:00", "15:00", "16:00"]),
                (Day::Saturday, &["09:00", "10:00", "11:00"]),
            ]),
            reviews: vec![review(
                "r5",
                "Kyle R.",
                5,
                "Helped me structure my essays perfectly.",
                "2023-10-20",
            )],
        },
        Teacher {
            profile: profile(
                "t4",
                "Sarah Pillay",
                "sarah@tutorconnect.sa",
                "https://picsum.photos/id/106/200/200",
            ),
            subjects: strings(&["Life Sciences", "Geography"]),
            grades: strings(&["Grade 10", "Grade 11"]),
            hourly_rate: 220,
            bio: "Biology enthusiast making Life Sciences fun and interactive using visual aids. I believe in hands-on learning.".to_string(),
            rating: 5.0,
            reviews_count: 32,
            is_online: true,
            verified: true,
            verification: VerificationState::new(VerificationStatus::Verified),
            qualifications: strings(&["B.Sc Life Sciences (UKZN)", "PGCE Senior Phase & FET"]),
            requirements: strings(&[
                "Stable Internet",
                "Whiteboard or iPad for diagrams",
                "Quiet Environment",
            ]),
            video_url: Some(INTRO_VIDEO.to_string()),
            balance: 2100,
            availability: availability(&[
                (Day::Monday, &["16:00", "17:00"]),
                (Day::Wednesday, &["16:00", "17:00"]),
                (Day::Friday, &["15:00", "16:00"]),
                (Day::Saturday, &["10:00", "11:00"]),
            ]),
            reviews: vec![review(
                "r6",
                "Priya N.",
                5,
                "Love the diagrams and explanations.",
                "2023-09-30",
            )],
        },
    ]
}

/// Seed bookings relative to `today`: one upcoming today, one completed yesterday.
pub fn bookings(today: NaiveDate) -> Vec<Booking> {
    vec![
        Booking {
            id: "b1".to_string(),
            teacher_id: "t1".to_string(),
            student_id: "s1".to_string(),
            teacher_name: "Thandi Nkosi".to_string(),
            student_name: "Student User".to_string(),
            subject: "Mathematics".to_string(),
            date: today,
            time: "14:00".to_string(),
            duration: 1,
            tutor_fee: 250,
            platform_fee: 30,
            total_paid: 280,
            status: BookingStatus::Upcoming,
            meet_link: Some("room-123".to_string()),
            payment_method: None,
            feedback_given: None,
        },
        Booking {
            id: "b2".to_string(),
            teacher_id: "t2".to_string(),
            student_id: "s1".to_string(),
            teacher_name: "Johan Van Der Merwe".to_string(),
            student_name: "Student User".to_string(),
            subject: "Accounting".to_string(),
            date: today - Duration::days(1),
            time: "16:00".to_string(),
            duration: 1,
            tutor_fee: 200,
            platform_fee: 30,
            total_paid: 230,
            status: BookingStatus::Completed,
            meet_link: None,
            payment_method: None,
            feedback_given: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_teachers_have_unique_ids() {
        let teachers = teachers();
        let mut ids: Vec<_> = teachers.iter().map(|t| t.id().to_string()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), teachers.len());
        assert!(teachers.iter().all(|t| is_demo_teacher(t.id())));
    }

    #[test]
    fn test_seed_bookings_are_most_recent_first() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let bookings = bookings(today);
        assert_eq!(bookings[0].date, today);
        assert!(bookings[1].date < bookings[0].date);
        assert!(bookings
            .iter()
            .all(|b| b.total_paid == b.tutor_fee + b.platform_fee));
    }
}
