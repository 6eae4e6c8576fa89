//! 终端做题循环 - 编排层
//!
//! 从标准输入逐行读取按键命令，交给 `SolveFlow` 执行，直到列表做完或用户退出

use crate::error::AppError;
use crate::utils::logging::{log_run_complete, truncate_text};
use crate::workflow::SolveFlow;
use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

const KEYS: &str = "s 开始 | p 暂停/继续 | h 提示 | t <文字> 作答 | i <图片> 附件 | a 看答案 | o 正确 | x 错误 | n 下一题 | q 退出";

/// 一行输入对应的操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveKey {
    Start,
    Pause,
    Hint,
    Solution(String),
    Attach(Option<String>),
    Answer,
    Grade(bool),
    Next,
    Quit,
    Unknown,
}

impl SolveKey {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (key, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match key {
            "s" => SolveKey::Start,
            "p" => SolveKey::Pause,
            "h" => SolveKey::Hint,
            "t" => SolveKey::Solution(rest.to_string()),
            "i" if rest.is_empty() => SolveKey::Attach(None),
            "i" => SolveKey::Attach(Some(rest.to_string())),
            "a" => SolveKey::Answer,
            "o" => SolveKey::Grade(true),
            "x" => SolveKey::Grade(false),
            "n" => SolveKey::Next,
            "q" => SolveKey::Quit,
            _ => SolveKey::Unknown,
        }
    }
}

#[derive(Debug, Default)]
struct RunStats {
    solved: usize,
    correct: usize,
}

/// 驱动一轮做题，`flow` 必须已经打开了第一题
pub async fn run(flow: &mut SolveFlow) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stats = RunStats::default();
    show_problem(flow);

    while let Some(line) = lines.next_line().await? {
        match handle(flow, SolveKey::parse(&line), &mut stats).await {
            Ok(true) => continue,
            Ok(false) => break,
            Err(e) if e.is_unauthorized() => {
                error!("❌ 登录已过期，请重新登录");
                return Err(e.into());
            }
            Err(e) => warn!("⚠️ {}", e),
        }
    }

    log_run_complete(stats.solved, stats.correct);
    Ok(())
}

/// 返回 false 表示结束循环
async fn handle(flow: &mut SolveFlow, key: SolveKey, stats: &mut RunStats) -> Result<bool, AppError> {
    match key {
        SolveKey::Start => {
            flow.start()?;
            info!("⏱️ 开始计时");
        }
        SolveKey::Pause => {
            let state = flow.toggle_pause()?;
            info!("{} {}", state, elapsed(flow));
        }
        SolveKey::Hint => match flow.reveal_next_hint()? {
            Some(hint) => info!("💡 提示 {}: {}", hint.step_number, hint.content),
            None => info!("没有更多提示"),
        },
        SolveKey::Solution(text) => {
            flow.set_solution(&text)?;
            info!("✓ 已记录作答: {}", truncate_text(&text, 40));
        }
        SolveKey::Attach(image) => flow.attach_image(image)?,
        SolveKey::Answer => {
            let answer = flow.check_answer()?;
            info!("📖 答案: {} ({})", answer.as_deref().unwrap_or("无答案图片"), elapsed(flow));
            info!("请判定: o 正确 / x 错误");
        }
        SolveKey::Grade(correct) => {
            flow.submit_grade(correct).await?;
            stats.solved += 1;
            if correct {
                stats.correct += 1;
            }
            info!("n 下一题");
        }
        SolveKey::Next => match flow.next().await? {
            Some(_) => show_problem(flow),
            None => {
                info!("🎉 列表已做完，返回会话选择");
                return Ok(false);
            }
        },
        SolveKey::Quit => {
            info!("已退出，进度保留，可用 resume 继续");
            return Ok(false);
        }
        SolveKey::Unknown => info!("{}", KEYS),
    }
    Ok(true)
}

fn show_problem(flow: &SolveFlow) {
    let (Some(ctx), Some(attempt)) = (flow.ctx(), flow.attempt()) else {
        return;
    };
    let attempt = attempt.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let problem = &attempt.problem().problem;

    info!("\n{} {}", ctx, problem.title);
    if let Some(url) = &problem.problem_image_url {
        info!("🖼️ 题目: {}", url);
    }
    info!("提示 {} 条 | {}", attempt.hint_count(), KEYS);
}

fn elapsed(flow: &SolveFlow) -> String {
    flow.attempt()
        .map(|a| {
            let secs = a.lock().map(|a| a.elapsed_secs()).unwrap_or_default();
            format!("{:02}:{:02}", secs / 60, secs % 60)
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys() {
        assert_eq!(SolveKey::parse("s"), SolveKey::Start);
        assert_eq!(SolveKey::parse("t  x = 2 "), SolveKey::Solution("x = 2".into()));
        assert_eq!(SolveKey::parse("i"), SolveKey::Attach(None));
        assert_eq!(SolveKey::parse("i work.png"), SolveKey::Attach(Some("work.png".into())));
        assert_eq!(SolveKey::parse("o"), SolveKey::Grade(true));
        assert_eq!(SolveKey::parse("what"), SolveKey::Unknown);
    }
}
