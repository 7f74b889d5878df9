//! Chat prompts for each tutor action.
//!
//! Every builder returns the complete message list sent to the model, in
//! order. System instructions for `continue` come after the dialogue so the
//! formatting rules are the last thing the model reads.

use crate::domain::conversation::{LearnerLevel, ResponseTiming};
use crate::ports::{Message, MessageRole};

pub fn start(topic: &str) -> Vec<Message> {
    vec![
        Message::system(format!(
            r#"You are an AI Socratic tutor. Your goal is to guide the learner through a series of thought-provoking questions about {topic}.
Ask open-ended questions to stimulate critical thinking. Your first question should be accessible but challenging.
Be encouraging and supportive. Focus on the Socratic method where you guide through questions, not direct teaching.
Keep your responses focused only on asking one question at a time. Do not provide answers or lengthy explanations.
Return only your question, nothing else."#
        )),
        Message::user(format!(
            "I want to learn about {topic} through the Socratic method. Please ask me your first question."
        )),
    ]
}

fn difficulty_guidance(level: Option<LearnerLevel>) -> String {
    match level {
        Some(level) => format!(
            "The user appears to be at a {} level, so adjust your questions accordingly.",
            level
        ),
        None => {
            "Adapt to the user's level of understanding based on their previous responses."
                .to_string()
        }
    }
}

fn pacing_guidance(timing: Option<ResponseTiming>) -> String {
    match timing {
        Some(timing) => {
            let adjustment = match timing {
                ResponseTiming::Fast => "increase complexity and depth",
                ResponseTiming::Slow => "simplify and provide more guidance",
                ResponseTiming::Normal => "maintain balanced complexity",
            };
            format!("The user responds at a {} pace, so {}.", timing, adjustment)
        }
        None => "Maintain a balanced pace in your responses.".to_string(),
    }
}

/// History, then the learner's answer unless the history already ends with
/// it, then the feedback/question instructions.
pub fn continuation(
    history: &[Message],
    user_response: &str,
    level: Option<LearnerLevel>,
    timing: Option<ResponseTiming>,
) -> Vec<Message> {
    let mut messages = history.to_vec();
    let already_present = history
        .last()
        .is_some_and(|m| m.role == MessageRole::User && m.content == user_response);
    if !already_present {
        messages.push(Message::user(user_response));
    }
    messages.push(Message::system(format!(
        r#"Based on the user's response, provide:
1. Brief feedback on their answer (1-2 sentences evaluating their response and encouraging critical thinking)
2. A follow-up question that builds upon their answer

{}
{}

Your follow-up question should push them to think more deeply or consider another aspect of the topic.
Format your response as:
"FEEDBACK: [Your feedback on their answer]

QUESTION: [Your next question]""#,
        difficulty_guidance(level),
        pacing_guidance(timing),
    )));
    messages
}

pub fn evaluation(topic: &str, history: &[Message]) -> Vec<Message> {
    let mut messages = vec![Message::system(format!(
        r#"You are evaluating a student's understanding of {topic} based on a Socratic dialogue.
Analyze the conversation history and determine:
1. Has the learner demonstrated a good understanding of {topic}?
2. Assign a confidence score from 0-100 indicating how well they've grasped the topic.
3. Provide a brief summary (3-4 sentences) of what the learner appears to understand.
4. Include a 1-2 sentence personalized feedback to help them improve further.

Return your evaluation in JSON format with these fields: "completed" (boolean), "confidence_score" (number 0-100), "summary" (string), and "feedback" (string)."#
    ))];
    messages.extend_from_slice(history);
    messages
}

pub fn extract_topic(prompt: &str) -> Vec<Message> {
    vec![
        Message::system(
            "Extract the main topic the user wants to learn about from this sentence. \
             Return ONLY the topic name, capitalized appropriately, with no explanation or additional text.",
        ),
        Message::user(prompt),
    ]
}

pub fn flashcards(topic: &str, count: u32) -> Vec<Message> {
    vec![
        Message::system(format!(
            r#"Create {count} specific and informative flashcards about "{topic}". Focus on key concepts, definitions, and important facts.
Each flashcard should have a clear question on the front and a concise, accurate answer on the back.
Return your response in this exact JSON format:
[
  {{
    "question": "Question on front of card",
    "answer": "Concise answer on back of card"
  }},
  ...
]

Make questions focused and specific to the topic "{topic}". Answers should be brief but informative."#
        )),
        Message::user(format!(
            "Generate {count} flashcards specifically about {topic}. Cover the most important concepts and facts."
        )),
    ]
}

pub fn summary(topic: &str) -> Vec<Message> {
    vec![
        Message::system(format!(
            r#"Create comprehensive but concise summarized notes specifically about "{topic}" for a student.
Structure the notes with bullet points, focusing on key concepts, definitions, and important relationships.
Include 6-8 main points that would help someone quickly review and understand {topic}.
Format each point with a bullet (•) and make sure the notes are informative yet concise.
Be specific to the topic "{topic}" and include factual information."#
        )),
        Message::user(format!(
            "Create summarized notes about {topic}. Include the most important facts and concepts."
        )),
    ]
}

pub fn challenge(topic: &str, count: u32) -> Vec<Message> {
    vec![
        Message::system(format!(
            r#"Create a multiple-choice quiz on the topic of "{topic}" with {count} questions.
Each question should have 4 options and exactly one correct answer.
Make sure the questions test understanding rather than just recall.

Return your response in this exact JSON format:
{{
  "questions": [
    {{
      "question": "Question text here",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correctAnswer": 0
    }},
    ...
  ],
  "timeLimit": 120
}}

The "correctAnswer" field should be the index (0-3) of the correct option.
Set a reasonable time limit in seconds for the entire quiz."#
        )),
        Message::user(format!("Please create a challenge quiz about {topic}.")),
    ]
}
