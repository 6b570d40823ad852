//! System prompt assembly.
//!
//! The prompt is the persona text with the rendered profile digest in the
//! middle, followed by one instruction for the conversation category.

use folio_core::{AssistantCategory, Proficiency};

/// Short summary of a student's profile handed to the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileDigest {
    pub name: String,
    pub department: String,
    pub course: String,
    pub year: Option<u8>,
    pub semester: Option<u8>,
    pub gpa: Option<f64>,
    /// Skill name with the student's self-reported level.
    pub skills: Vec<(String, Proficiency)>,
    /// Titles of verified certificates.
    pub certificates: Vec<String>,
    /// Titles of verified achievements.
    pub achievements: Vec<String>,
    pub jobs: usize,
    pub internships: usize,
}

impl ProfileDigest {
    /// Render as newline-separated `Label: value` lines. Empty sections are omitted.
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("Name: {}", self.name),
            format!("Department: {}", self.department),
            format!("Course: {}", self.course),
            format!(
                "Year: {}, Semester: {}",
                display_or_dash(self.year),
                display_or_dash(self.semester)
            ),
        ];

        if let Some(gpa) = self.gpa {
            lines.push(format!("Current GPA: {gpa}"));
        }
        if !self.skills.is_empty() {
            let skills: Vec<String> = self
                .skills
                .iter()
                .map(|(name, level)| format!("{name} ({level})"))
                .collect();
            lines.push(format!("Skills: {}", skills.join(", ")));
        }
        if !self.certificates.is_empty() {
            lines.push(format!("Certificates: {}", self.certificates.join(", ")));
        }
        if !self.achievements.is_empty() {
            lines.push(format!("Achievements: {}", self.achievements.join(", ")));
        }

        let mut experience = Vec::new();
        if self.jobs > 0 {
            experience.push(format!("Jobs: {}", self.jobs));
        }
        if self.internships > 0 {
            experience.push(format!("Internships: {}", self.internships));
        }
        if !experience.is_empty() {
            lines.push(format!("Work Experience: {}", experience.join(", ")));
        }

        lines.join("\n")
    }
}

fn display_or_dash(value: Option<u8>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Instruction appended for each conversation category.
pub fn category_instruction(category: AssistantCategory) -> &'static str {
    match category {
        AssistantCategory::CareerGuidance => {
            "Focus on career paths, industry insights, and professional development advice."
        }
        AssistantCategory::SkillRecommendation => {
            "Suggest relevant skills to develop based on their current profile and career goals."
        }
        AssistantCategory::ResumeHelp => {
            "Provide resume writing tips and help improve their professional presentation."
        }
        AssistantCategory::InterviewPrep => {
            "Offer interview preparation advice and practice questions."
        }
        AssistantCategory::JobSearch => {
            "Help with job search strategies and identifying opportunities."
        }
        AssistantCategory::LearningPath => {
            "Create learning paths and recommend courses or resources."
        }
        AssistantCategory::ProjectIdeas => {
            "Suggest project ideas that align with their skills and interests."
        }
        AssistantCategory::GeneralAdvice => "Provide general professional and academic advice.",
    }
}

/// Build the full system prompt for a conversation.
pub fn system_prompt(category: AssistantCategory, digest: &ProfileDigest) -> String {
    format!(
        "You are a career guidance AI assistant helping students in their professional \
         development. Here's the student's profile:\n\n{}\n\nPlease provide helpful, \
         personalized advice based on their background and goals. Keep responses concise, \
         actionable, and encouraging.\n\n{}",
        digest.render(),
        category_instruction(category)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest() -> ProfileDigest {
        ProfileDigest {
            name: "Asha Rao".into(),
            department: "Computer Science".into(),
            course: "B.Tech".into(),
            year: Some(3),
            semester: Some(5),
            gpa: Some(8.4),
            skills: vec![
                ("Rust".into(), Proficiency::Intermediate),
                ("SQL".into(), Proficiency::Advanced),
            ],
            certificates: vec!["AWS Cloud Practitioner".into()],
            achievements: vec![],
            jobs: 0,
            internships: 1,
        }
    }

    #[test]
    fn render_includes_populated_sections_only() {
        let text = digest().render();
        assert!(text.starts_with("Name: Asha Rao\nDepartment: Computer Science"));
        assert!(text.contains("Year: 3, Semester: 5"));
        assert!(text.contains("Current GPA: 8.4"));
        assert!(text.contains("Skills: Rust (INTERMEDIATE), SQL (ADVANCED)"));
        assert!(text.contains("Certificates: AWS Cloud Practitioner"));
        assert!(!text.contains("Achievements:"));
        assert!(text.contains("Work Experience: Internships: 1"));
        assert!(!text.contains("Jobs:"));
    }

    #[test]
    fn render_without_gpa_or_experience() {
        let mut d = digest();
        d.gpa = None;
        d.internships = 0;
        let text = d.render();
        assert!(!text.contains("GPA"));
        assert!(!text.contains("Work Experience"));
    }

    #[test]
    fn system_prompt_embeds_digest_and_category() {
        let prompt = system_prompt(AssistantCategory::InterviewPrep, &digest());
        assert!(prompt.starts_with("You are a career guidance AI assistant"));
        assert!(prompt.contains("Name: Asha Rao"));
        assert!(prompt.ends_with("Offer interview preparation advice and practice questions."));
    }

    #[test]
    fn every_category_has_an_instruction() {
        for category in AssistantCategory::ALL {
            assert!(!category_instruction(*category).is_empty());
        }
    }
}
