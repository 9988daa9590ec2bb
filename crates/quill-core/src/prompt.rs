//! Prompt construction

use crate::error::TaskError;
use crate::story::{step_title, StoryState};
use crate::task::{Expectation, Task};
use quill_provider::{ChatMessage, ChatRequest};

/// System message sent with every task
pub const SYSTEM_PROMPT: &str = "You are an expert novelist and creative writing assistant. \
You are guiding a user through the Snowflake Method. Your tone is encouraging and insightful. \
When asked to generate ideas, be creative and provide distinct options.";

/// Appended to prompts expecting story ideas
pub const IDEAS_FORMAT: &str = "\n\nReturn the response as a pure JSON array with objects of the shape \
{\"summary\": string, \"angle\": string} and no surrounding commentary.";

/// Appended to prompts expecting characters
pub const CHARACTERS_FORMAT: &str = "\n\nReturn ONLY valid JSON (no markdown) as an array of objects: \
[{\"name\": \"string\", \"summary\": \"string\"}].";

const IDEAS_SHAPE: &str = "Return the response as a pure JSON array of {\"summary\": string, \"angle\": string}.";

/// Chat request for `task` against the current story
///
/// # Errors
/// - `TaskError::EmptyStepText` for `generate`/`refine` on a blank step
///   without `override_query`
/// - `TaskError::UnsupportedStep` if the task has no prompt for the step
pub fn build_request(
    model: &str,
    task: Task,
    story: &StoryState,
    override_query: Option<&str>,
) -> Result<ChatRequest, TaskError> {
    let prompt = user_prompt(task, story, override_query)?;
    tracing::debug!(task = %task, chars = prompt.len(), "prompt built");

    Ok(ChatRequest::new(model)
        .with_message(ChatMessage::system(SYSTEM_PROMPT))
        .with_message(ChatMessage::user(prompt)))
}

/// User message for `task`, format suffix included
///
/// # Errors
/// See [`build_request`]
pub fn user_prompt(
    task: Task,
    story: &StoryState,
    override_query: Option<&str>,
) -> Result<String, TaskError> {
    let override_query = override_query.filter(|q| !q.trim().is_empty());
    let current = story.current_text();

    if task.requires_step_text() && current.trim().is_empty() && override_query.is_none() {
        return Err(TaskError::EmptyStepText);
    }

    let mut prompt = match override_query {
        Some(query) => query.to_string(),
        None => task_prompt(task, story)?,
    };

    match task.expectation(override_query.is_some()) {
        Expectation::Ideas => prompt.push_str(IDEAS_FORMAT),
        Expectation::Characters => prompt.push_str(CHARACTERS_FORMAT),
        Expectation::Markdown => {}
    }
    Ok(prompt)
}

fn or_placeholder(text: &str, placeholder: &'static str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        placeholder.to_string()
    } else {
        trimmed.to_string()
    }
}

fn task_prompt(task: Task, story: &StoryState) -> Result<String, TaskError> {
    let step = story.current_step();
    let current = story.current_text();
    let step_one = story.step_text(1);
    let context = format!(
        "Here is the current story context from previous steps:\n\n**Step 1:** {}",
        if step_one.is_empty() { "Not started." } else { step_one }
    );
    let title = step_title(step);

    let prompt = match (task, step) {
        (Task::Generate, 1) => format!(
            "Act as a master storyteller and genre expert. The user has provided the following raw story premise: \"{current}\". \
Your task is to transform this premise into 4 distinct, compelling one-sentence summaries that could launch a novel.\n\n\
For each summary, you must:\n\
1) Explore a radically different creative direction (e.g., change genre, protagonist motivation, central conflict).\n\
2) Provide a specific and evocative \"angle\" that captures sub-genre and tone (e.g., 'Hopepunk Adventure', 'Gothic Steampunk', 'Cosmic Horror Mystery'). Avoid generic labels.\n\n\
{IDEAS_SHAPE}"
        ),
        (Task::Generate, 2) => format!(
            "You are assisting with Step 2 of the Snowflake Method.\n\n\
Given the finalized one-sentence summary from Step 1:\n\"{step_one}\"\n\n\
And the user's current notes for Step 2 (may be empty):\n\"{current}\"\n\n\
Generate 3 complete one-paragraph story summaries. Each version should propose a different three-act shape:\n\
- One that is character-driven (internal change, relationship stakes)\n\
- One that is plot-driven (external disasters escalate)\n\
- One that leans into mystery/twist (revelations and reversals)\n\n\
Each paragraph should stand alone as a clear, cohesive plot outline. For each, provide a concise, evocative angle label like 'Character-Driven', 'Plot-Driven', or 'Mystery Twist'.\n\n\
{IDEAS_SHAPE}"
        ),
        (Task::Brainstorm, 1) => format!(
            "{context}\n\nThe user is on {title}. Provide creative prompts and guidelines to help explore different directions for a strong one-sentence hook."
        ),
        (Task::Brainstorm, 2) => format!(
            "{context}\n\nThe user is on {title}. Offer advice on shaping a strong paragraph summary (setup, escalating disasters, ending). \
Include tips to anticipate Step 3 (Character Summaries): what protagonist/antagonist roles emerge from this paragraph?"
        ),
        (Task::Refine, 1) => format!(
            "{context}\n\nThe user wrote: \"{current}\". Help refine the one-sentence summary: tighten clarity, stakes, and specificity. Provide 2-3 improved options."
        ),
        (Task::Refine, 2) => format!(
            "{context}\n\nThe user wrote this Step 2 paragraph:\n\n\"{current}\"\n\n\
Help refine it: strengthen the disasters and turning points, ensure causal flow to the ending, and tighten prose. \
Provide 1 polished version plus 2 alternative outlines that push different focuses (character, plot, or mystery)."
        ),
        (Task::SuggestCharacters, _) => format!(
            "Return ONLY valid JSON (no markdown) as an array of objects: [{{\"name\": \"string\", \"summary\": \"string\"}}]. \
Generate 5 distinct, archetype-varied characters grounded in the following story context:\n\n\
Step 1 (One-sentence summary):\n{}\n\n\
Step 2 (One-paragraph summary):\n{}\n\n\
Rules:\n\
- Each summary is 1–2 sentences (max 280 chars), concrete and specific.\n\
- Names should be human-readable and setting-appropriate.\n\
- Avoid duplicates; no worldbuilding dumps; no spoilers.",
            or_placeholder(step_one, "N/A"),
            or_placeholder(story.step_text(2), "N/A"),
        ),
        (task, step) => return Err(TaskError::UnsupportedStep { task, step }),
    };
    Ok(prompt)
}
