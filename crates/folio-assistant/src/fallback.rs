//! Canned replies used when no completion backend is configured.

use folio_core::AssistantCategory;
use rand::seq::SliceRandom;
use rand::Rng;

/// Canned paragraphs for a category. Never empty.
pub fn canned_replies(category: AssistantCategory) -> &'static [&'static str] {
    match category {
        AssistantCategory::CareerGuidance => &[
            "Based on your profile, I'd recommend exploring careers that align with your current skills and interests. Consider researching job market trends in your field and networking with professionals.",
            "Your academic background shows great potential! Consider reaching out to career counselors or industry professionals for personalized advice about career paths in your domain.",
        ],
        AssistantCategory::SkillRecommendation => &[
            "Looking at your current skill set, I'd suggest focusing on both technical and soft skills. Consider learning complementary technologies and improving communication skills.",
            "To enhance your profile, consider adding skills that are in high demand in your field. Online courses and certifications can be a great way to build expertise.",
        ],
        AssistantCategory::ResumeHelp => &[
            "When crafting your resume, highlight your achievements with specific metrics. Include your verified certificates and skills prominently, and tailor it to each job application.",
            "Make sure your resume tells a story of your growth and potential. Include projects, internships, and any leadership experiences you've had.",
        ],
        AssistantCategory::InterviewPrep => &[
            "Practice common interview questions and prepare specific examples from your experience. Research the company thoroughly and prepare thoughtful questions to ask.",
            "Focus on the STAR method (Situation, Task, Action, Result) when describing your experiences. Practice with mock interviews to build confidence.",
        ],
        AssistantCategory::JobSearch => &[
            "Use multiple job search platforms and consider applying directly to company websites. Leverage your network and consider reaching out to alumni in your field.",
            "Create a strong online presence on professional platforms. Tailor your applications to each role and follow up appropriately after interviews.",
        ],
        AssistantCategory::LearningPath => &[
            "Create a structured learning plan based on your career goals. Mix theoretical knowledge with practical projects to reinforce your learning.",
            "Consider both formal courses and hands-on projects. Build a portfolio that demonstrates your skills and continuous learning mindset.",
        ],
        AssistantCategory::ProjectIdeas => &[
            "Consider projects that solve real-world problems in your area of interest. This will help you build practical skills while creating portfolio pieces.",
            "Look for project ideas that combine multiple technologies or skills you want to develop. Open source contributions can also be valuable.",
        ],
        AssistantCategory::GeneralAdvice => &[
            "Focus on continuous learning and building a strong professional network. Stay updated with industry trends and be open to new opportunities.",
            "Balance technical skills with soft skills like communication and teamwork. Seek feedback regularly and be willing to step out of your comfort zone.",
        ],
    }
}

/// Pick one canned reply uniformly at random.
pub fn pick<R: Rng + ?Sized>(category: AssistantCategory, rng: &mut R) -> &'static str {
    let replies = canned_replies(category);
    replies.choose(rng).copied().unwrap_or(replies[0])
}
