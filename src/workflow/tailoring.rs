//! 裁剪流水线 - 流程层
//!
//! 流程顺序：
//! 1. seed：用职位描述开启对话，得到种子令牌
//! 2. titles：收敛循环
//! 3. profile：收敛循环
//! 4. work：收敛循环，每条工作经历并发请求，全部返回后才展示
//!
//! 任一阶段被放弃即终止整个流水线，不再执行后续阶段

use std::fmt;

use chrono::{SecondsFormat, Utc};
use futures::future::try_join_all;

use crate::error::AppResult;
use crate::models::{
    Cv, JobDescription, ResponseId, TailoredCv, TailoredFragment, TailoredProfile,
    TailoredTitles, TailoredWorkExperience,
};
use crate::services::CvTailor;
use crate::utils::logging::log_stage_start;
use crate::workflow::convergence::{converge, ConvergeOutcome, ProduceContext, Reviewer};

/// 展示能力
///
/// 只负责把片段和原简历的差异显示给评审者
pub trait Presenter: Send + Sync {
    fn present_titles(&self, cv: &Cv, fragment: &TailoredFragment<TailoredTitles>);

    fn present_profile(&self, cv: &Cv, fragment: &TailoredFragment<TailoredProfile>);

    /// `fragments[i]` 对应 `cv.work[i]`
    fn present_work(&self, cv: &Cv, fragments: &[TailoredFragment<TailoredWorkExperience>]);
}

/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Titles,
    Profile,
    WorkExperience,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Section::Titles => "titles",
            Section::Profile => "profile",
            Section::WorkExperience => "work experience",
        })
    }
}

/// 流水线结果
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Completed(TailoredCv),
    /// 评审者在该阶段放弃
    Abandoned { section: Section },
}

type WorkFragments = Vec<TailoredFragment<TailoredWorkExperience>>;

/// 裁剪流水线
///
/// - 续接令牌作为值在阶段之间显式传递，不保存会话状态
/// - 不持有任何资源，只依赖裁剪能力、展示能力和评审者
pub struct TailoringPipeline<'a> {
    tailor: &'a dyn CvTailor,
    presenter: &'a dyn Presenter,
    reviewer: &'a dyn Reviewer,
    auto_accept: bool,
}

impl<'a> TailoringPipeline<'a> {
    pub fn new(
        tailor: &'a dyn CvTailor,
        presenter: &'a dyn Presenter,
        reviewer: &'a dyn Reviewer,
        auto_accept: bool,
    ) -> Self {
        Self {
            tailor,
            presenter,
            reviewer,
            auto_accept,
        }
    }

    /// 运行完整流水线
    pub async fn run(&self, cv: &Cv, jd: &JobDescription) -> AppResult<PipelineOutcome> {
        log_stage_start("开启对话");
        let seed = self.tailor.seed(jd).await?;

        log_stage_start("裁剪标题");
        let titles = match self.converge_titles(&seed, cv, jd).await? {
            ConvergeOutcome::Accepted(fragment) => fragment,
            ConvergeOutcome::Rejected => return Ok(abandoned(Section::Titles)),
        };

        log_stage_start("裁剪简介");
        let profile = match self.converge_profile(&seed, cv, jd).await? {
            ConvergeOutcome::Accepted(fragment) => fragment,
            ConvergeOutcome::Rejected => return Ok(abandoned(Section::Profile)),
        };

        log_stage_start("裁剪工作经历");
        let work = match self.converge_work(&seed, cv, jd).await? {
            ConvergeOutcome::Accepted(fragments) => fragments,
            ConvergeOutcome::Rejected => return Ok(abandoned(Section::WorkExperience)),
        };

        Ok(PipelineOutcome::Completed(TailoredCv {
            titles: titles.response,
            profile: profile.response,
            work_experience: work.into_iter().map(|f| f.response).collect(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }))
    }

    async fn converge_titles(
        &self,
        seed: &ResponseId,
        cv: &Cv,
        jd: &JobDescription,
    ) -> AppResult<ConvergeOutcome<TailoredFragment<TailoredTitles>>> {
        let tailor = self.tailor;
        converge(
            &Section::Titles.to_string(),
            move |ctx: ProduceContext<TailoredFragment<TailoredTitles>>| async move {
                let previous = continuation(ctx.prev_result.as_ref(), seed);
                tailor
                    .tailor_titles(previous, cv, jd, ctx.feedback.as_deref())
                    .await
            },
            |fragment| self.presenter.present_titles(cv, fragment),
            self.reviewer,
            self.auto_accept,
        )
        .await
    }

    async fn converge_profile(
        &self,
        seed: &ResponseId,
        cv: &Cv,
        jd: &JobDescription,
    ) -> AppResult<ConvergeOutcome<TailoredFragment<TailoredProfile>>> {
        let tailor = self.tailor;
        converge(
            &Section::Profile.to_string(),
            move |ctx: ProduceContext<TailoredFragment<TailoredProfile>>| async move {
                let previous = continuation(ctx.prev_result.as_ref(), seed);
                tailor
                    .tailor_profile(previous, cv, jd, ctx.feedback.as_deref())
                    .await
            },
            |fragment| self.presenter.present_profile(cv, fragment),
            self.reviewer,
            self.auto_accept,
        )
        .await
    }

    async fn converge_work(
        &self,
        seed: &ResponseId,
        cv: &Cv,
        jd: &JobDescription,
    ) -> AppResult<ConvergeOutcome<WorkFragments>> {
        let tailor = self.tailor;
        converge(
            &Section::WorkExperience.to_string(),
            move |ctx: ProduceContext<WorkFragments>| async move {
                let feedback = ctx.feedback.as_deref();
                // 每条经历从自己上一轮的令牌续接
                let calls = (0..cv.work.len()).map(|index| {
                    let prev = ctx.prev_result.as_ref().and_then(|p| p.get(index));
                    tailor.tailor_work_entry(continuation(prev, seed), cv, index, jd, feedback)
                });
                try_join_all(calls).await
            },
            |fragments| self.presenter.present_work(cv, fragments),
            self.reviewer,
            self.auto_accept,
        )
        .await
    }
}

/// 上一轮的令牌，第一轮用种子令牌
fn continuation<'r, T>(
    prev: Option<&'r TailoredFragment<T>>,
    seed: &'r ResponseId,
) -> &'r ResponseId {
    prev.map(|p| &p.response_id).unwrap_or(seed)
}

fn abandoned(section: Section) -> PipelineOutcome {
    PipelineOutcome::Abandoned { section }
}
