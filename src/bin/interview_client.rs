//! Terminal front end for the interviewer backend.
//!
//! Usage: interview-client <company> <position> [Coding|"Product Sense"] [Easy|Medium|Hard] [recruiter notes...]
//!
//! Each stdin line is sent to `/process`; `/summary` asks for feedback and
//! `/exit` quits. The backend address comes from `INTERVIEWER_URL`.

use std::env;

use ai_interviewer::interview::{AgentResponse, Difficulty, InterviewType, SessionConfig, UserInput};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const DEFAULT_URL: &str = "http://127.0.0.1:8000";

fn parse_interview_type(arg: Option<&str>) -> InterviewType {
    match arg.map(str::to_ascii_lowercase).as_deref() {
        Some("product sense") | Some("product") => InterviewType::ProductSense,
        _ => InterviewType::Coding,
    }
}

fn parse_difficulty(arg: Option<&str>) -> Difficulty {
    match arg.map(str::to_ascii_lowercase).as_deref() {
        Some("easy") => Difficulty::Easy,
        Some("hard") => Difficulty::Hard,
        _ => Difficulty::Medium,
    }
}

async fn post(
    client: &reqwest::Client,
    url: &str,
    body: Option<&impl serde::Serialize>,
) -> Result<AgentResponse, reqwest::Error> {
    let mut request = client.post(url);
    if let Some(body) = body {
        request = request.json(body);
    }
    request.send().await?.json::<AgentResponse>().await
}

fn show(response: &AgentResponse) {
    if response.is_success() {
        println!("\nInterviewer: {}\n", response.response);
    } else {
        println!("\nAn error occurred: {}\n", response.response);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 2 {
        eprintln!(
            "usage: interview-client <company> <position> [Coding|\"Product Sense\"] [Easy|Medium|Hard] [recruiter notes...]"
        );
        std::process::exit(2);
    }

    let base = env::var("INTERVIEWER_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    let base = base.trim_end_matches('/');
    let client = reqwest::Client::new();

    let recruiter_notes = args.get(4..).map(|rest| rest.join(" ")).filter(|s| !s.is_empty());
    let session = SessionConfig {
        company: args[0].clone(),
        position: args[1].clone(),
        interview_type: parse_interview_type(args.get(2).map(String::as_str)),
        recruiter_material: recruiter_notes,
        difficulty: Some(parse_difficulty(args.get(3).map(String::as_str))),
    };

    let response = post(&client, &format!("{}/set_session_data", base), Some(&session)).await?;
    if !response.is_success() {
        println!("Failed to set interview details: {}", response.response);
        return Ok(());
    }
    println!(
        "{} interview for {} at {} is ready. Say hello to begin (/summary, /exit).",
        session.interview_type, session.position, session.company
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"You: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line {
            "" => continue,
            "/exit" => break,
            "/summary" => {
                let response =
                    post(&client, &format!("{}/get_summary", base), None::<&()>).await?;
                show(&response);
            }
            _ => {
                let input = UserInput {
                    input: line.to_string(),
                };
                let response = post(&client, &format!("{}/process", base), Some(&input)).await?;
                show(&response);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_parsing() {
        assert_eq!(parse_interview_type(Some("Product Sense")), InterviewType::ProductSense);
        assert_eq!(parse_interview_type(Some("coding")), InterviewType::Coding);
        assert_eq!(parse_interview_type(None), InterviewType::Coding);
        assert_eq!(parse_difficulty(Some("HARD")), Difficulty::Hard);
        assert_eq!(parse_difficulty(None), Difficulty::Medium);
    }
}
