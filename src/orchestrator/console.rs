//! 终端交互 - 编排层
//!
//! - `ConsolePresenter`: 彩色展示每个阶段的前后差异
//! - `ConsoleReviewer`: 从标准输入读取接受 / 放弃 / 修改意见
//! - `prompt_job_source`: 交互式选择职位描述来源

use std::io::{self, BufRead, Read, Write};

use async_trait::async_trait;
use colored::Colorize;

use crate::error::{AppError, AppResult, ConfigError};
use crate::models::{
    Cv, TailoredFragment, TailoredProfile, TailoredTitles, TailoredWorkExperience,
};
use crate::workflow::{Presenter, ReviewDecision, Reviewer};

/// 终端展示
pub struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn present_titles(&self, cv: &Cv, fragment: &TailoredFragment<TailoredTitles>) {
        let titles = &fragment.response;
        print_diff(
            "Titles",
            &cv.titles.join(" | "),
            &titles.optimised_titles.join(" | "),
        );
        print_scores(titles.original_match_score_pct, titles.optimised_match_score_pct);
        print_list("Gaps", &titles.gaps);
        print_list("Unconfirmed Suggestions", &titles.suggestions);
    }

    fn present_profile(&self, cv: &Cv, fragment: &TailoredFragment<TailoredProfile>) {
        let profile = &fragment.response;
        print_diff("Profile", &cv.profile, &profile.optimised_profile);
        print_scores(profile.original_match_score_pct, profile.optimised_match_score_pct);
        print_list("Gaps", &profile.gaps);
        print_list("Unconfirmed Suggestions", &profile.suggestions);
        println!("\n{}", "ATS Perfect Match".bold());
        println!("{}", profile.ats_perfect_match.cyan());
    }

    fn present_work(&self, cv: &Cv, fragments: &[TailoredFragment<TailoredWorkExperience>]) {
        for (index, (entry, fragment)) in cv.work.iter().zip(fragments).enumerate() {
            let work = &fragment.response;
            println!(
                "\n{}",
                format!("[{}] {} - {}", index + 1, entry.company, entry.position)
                    .bold()
                    .underline()
            );
            print_scores(work.original_match_score_pct, work.optimised_match_score_pct);

            let original: Vec<String> = entry.achievements.iter().map(|a| format!("- {}", a)).collect();
            let optimised: Vec<String> = work
                .optimised_achievements
                .iter()
                .map(|a| format!("- [{:.0}] {}", a.match_score_pct, a.optimised_achievement))
                .collect();
            print_diff("Achievements", &original.join("\n"), &optimised.join("\n"));

            let original_stack = entry.stack.as_deref().unwrap_or_default().join(", ");
            let optimised_stack: Vec<String> = work
                .optimised_stack
                .iter()
                .map(|s| format!("[{:.0}] {}", s.match_score_pct, s.optimised_stack))
                .collect();
            print_diff("Stack", &original_stack, &optimised_stack.join(", "));
        }
    }
}

fn print_diff(title: &str, original: &str, optimised: &str) {
    println!("\n{}", title.bold());
    println!("{}", original.blue());
    println!("{}", optimised.green());
}

fn print_scores(original: f64, optimised: f64) {
    println!(
        "{} {:.0}% → {:.0}%",
        "Match:".dimmed(),
        original,
        optimised
    );
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n{}", title.bold());
    for item in items {
        println!("{} {}", "-".yellow(), item);
    }
}

/// 终端评审者
pub struct ConsoleReviewer;

#[async_trait]
impl Reviewer for ConsoleReviewer {
    async fn review(&self, section: &str) -> AppResult<ReviewDecision> {
        loop {
            let answer = prompt_line(&format!(
                "\n[{}] {}ccept / {}eject / {}eedback: ",
                section,
                "(a)".green().bold(),
                "(r)".red().bold(),
                "(f)".yellow().bold()
            ))
            .await?;
            // read_line 在输入结束时返回空串（连换行都没有）
            if answer.is_empty() {
                return Err(AppError::Other("标准输入已关闭，无法继续评审".to_string()));
            }

            match answer.trim().to_lowercase().as_str() {
                "a" | "accept" => return Ok(ReviewDecision::Accept),
                "r" | "reject" => return Ok(ReviewDecision::Reject),
                "f" | "feedback" => {
                    println!("Feedback (one item per line, empty line to finish):");
                    let feedback = read_stdin(read_items).await?;
                    if feedback.is_empty() {
                        eprintln!("{} no feedback given", "Note:".cyan().bold());
                        continue;
                    }
                    return Ok(ReviewDecision::Feedback(feedback));
                }
                other => eprintln!("{} unknown choice '{}'", "Note:".cyan().bold(), other),
            }
        }
    }
}

/// 交互输入的职位描述来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JdSource {
    Url(String),
    Text(String),
}

/// 询问职位描述来源
///
/// 空输入返回 `MissingJobDescription`
pub async fn prompt_job_source() -> AppResult<JdSource> {
    let choice = prompt_line(&format!(
        "Job description source: {}rl / plain {}ext: ",
        "(u)".bold(),
        "(t)".bold()
    ))
    .await?;

    let source = match choice.trim().to_lowercase().as_str() {
        "u" | "url" => {
            let url = prompt_line("URL: ").await?;
            JdSource::Url(url.trim().to_string())
        }
        _ => {
            println!("Paste the job description, then press Ctrl-D to finish:");
            JdSource::Text(read_stdin(read_text_block).await?)
        }
    };

    match &source {
        JdSource::Url(s) | JdSource::Text(s) if s.trim().is_empty() => {
            Err(ConfigError::MissingJobDescription.into())
        }
        _ => Ok(source),
    }
}

async fn prompt_line(prompt: &str) -> AppResult<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    read_stdin(|mut stdin| {
        let mut input = String::new();
        stdin.read_line(&mut input).map(|_| input)
    })
    .await
}

/// 读取到输入结束，保留段落之间的空行
fn read_text_block(mut reader: impl BufRead) -> io::Result<String> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(text.trim().to_string())
}

/// 逐行读取直到空行或输入结束
fn read_items(reader: impl BufRead) -> io::Result<Vec<String>> {
    let mut items = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        items.push(line.trim_end_matches('\r').to_string());
    }
    Ok(items)
}

/// 在阻塞线程上读取标准输入
async fn read_stdin<T, F>(read: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(io::StdinLock<'static>) -> io::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || read(io::stdin().lock()))
        .await
        .map_err(|e| AppError::Other(format!("读取输入失败: {}", e)))?
        .map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_block_keeps_every_paragraph() {
        let pasted = "Senior Rust Engineer\n\nAbout us\nWe map biomedical research.\n\nRequirements\n- Rust\n- Postgres\n";

        let text = read_text_block(pasted.as_bytes()).unwrap();

        assert!(text.starts_with("Senior Rust Engineer\n\nAbout us"));
        assert!(text.ends_with("Requirements\n- Rust\n- Postgres"));
    }

    #[test]
    fn test_feedback_items_stop_at_blank_line() {
        let typed = "more metrics\r\nshorter bullets\n\nnot feedback\n";

        let items = read_items(typed.as_bytes()).unwrap();

        assert_eq!(items, vec!["more metrics", "shorter bullets"]);
    }

    #[test]
    fn test_feedback_items_end_of_input() {
        assert!(read_items("".as_bytes()).unwrap().is_empty());
        assert_eq!(read_items("only line".as_bytes()).unwrap(), vec!["only line"]);
    }
}
