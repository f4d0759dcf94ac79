use crate::gitlab::Commit;

use std::fmt::Write;

const PROMPT_HEADER: &str = "\
<background-data>
  You are an AI agent whose purpose is to generate clean, professional changelogs from raw commit data.
</background-data>

<task>
  Generate a changelog from a list of commit messages.
</task>

<requirements>
  - Output must be a simple, clean list with one bullet per final item.
  - Do NOT include any title, headers, introductions, or explanations.
  - Each item must summarize the commit clearly, concisely, and professionally.
";

const AUTHOR_REQUIREMENT: &str =
    "  - Append the author's name to each summarized item in the format: \" — Author Name\".\n";

const PROMPT_FOOTER: &str = "\
  - Remove ALL conventional commit prefixes at the beginning of messages:
      e.g. \"feat:\", \"fix:\", \"chore:\", \"refactor:\", \"style:\", \"perf:\", \"revert:\", \"Feature:\", \"Feat:\", \"Fix:\", etc.
  - Remove any prefix ending with \":\" at the start of the message.
  - Completely exclude ALL merge commits (any commit whose message contains \"Merge branch\", \"Merge pull request\", or \"See merge request\").
  - Remove redundant or duplicate commits (same or near-identical content).
  - Group similar commits into a single summarized item when appropriate.
  - Preserve the original intent of each commit while improving clarity.
  - Keep a neutral, professional tone.
  - Output only the final cleaned list, with no labels and no explanations.
</requirements>
";

/// The fixed instruction sent with every changelog request
pub fn create_system_prompt(include_authors: bool) -> String {
    let mut prompt = String::from(PROMPT_HEADER);
    if include_authors {
        prompt.push_str(AUTHOR_REQUIREMENT);
    }
    prompt.push_str(PROMPT_FOOTER);
    prompt
}

/// One bullet per commit message, optionally tagged with its author
pub fn create_user_prompt(commits: &[Commit], include_authors: bool) -> String {
    let mut prompt = String::from("Create a changelog for the following commits:\n\n");

    for commit in commits {
        let message = commit.message.trim().replace('\n', "\n  ");
        if include_authors && !commit.author_name.is_empty() {
            writeln!(prompt, "- {message} — {}", commit.author_name)
                .expect("write to string should not fail");
        } else {
            writeln!(prompt, "- {message}").expect("write to string should not fail");
        }
    }

    prompt
}
