//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：打开本地存储、恢复登录状态、创建 API 客户端
//! 2. **命令分发**：每条终端命令对应一个业务能力或做题流程
//! 3. **资源管理**：唯一持有存储和 `SessionContext` 的模块
//! 4. **错误呈现**：读失败打印重试提示，写失败打印失败的操作名

use crate::clients::{OdapClient, ProblemQuery};
use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::{ApiTransport, FileStore, KeyValueStore, SessionContext};
use crate::models::{CurriculumCreate, ImageFile, Problem, Rankable, ReorderResource};
use crate::orchestrator::command::{remember_choice, Command, CurriculumArgs, DeleteTarget, FilterArgs};
use crate::orchestrator::solve_session;
use crate::services::crop::{clamp_to, scale_to_natural};
use crate::services::curriculum_filter::CurriculumFilter;
use crate::services::problem_form::{
    toggle_selection, validate_curriculum_name, validate_folder_name, validate_session,
};
use crate::services::{
    AuthService, DragEnd, LastSelection, ListReorder, PlaylistStore, Preferences, ProblemDraft, ReorderBackend,
};
use crate::utils::logging::{log_startup, truncate_text};
use crate::workflow::SolveFlow;
use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    store: Arc<dyn KeyValueStore>,
    client: OdapClient,
    auth: AuthService,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let store: Arc<dyn KeyValueStore> = Arc::new(
            FileStore::open(&config.storage_path)
                .with_context(|| format!("打开本地存储失败: {}", config.storage_path))?,
        );
        let session = SessionContext::init(store.clone());
        let client = OdapClient::new(ApiTransport::new(&config.api_base_url, session.clone()));
        let auth = AuthService::new(client.clone(), session);

        if auth.is_authenticated() {
            info!("✓ 已恢复登录状态");
        }

        Ok(Self {
            config,
            store,
            client,
            auth,
        })
    }

    /// 运行一条命令
    pub async fn run(&self, command: Command) -> Result<()> {
        if requires_login(&command) && !self.auth.is_authenticated() {
            bail!("尚未登录，请先执行 login");
        }

        let result = self.dispatch(command).await;
        if let Err(e) = &result {
            if let Some(app_err) = e.downcast_ref::<AppError>() {
                if app_err.is_unauthorized() {
                    error!("❌ 登录已过期，请重新登录");
                }
            }
        }
        result
    }

    async fn dispatch(&self, command: Command) -> Result<()> {
        match command {
            // ========== 认证 ==========
            Command::Login {
                username,
                password,
                remember_user,
                forget_user,
                remember_password,
                forget_password,
            } => {
                let remembered = self.auth.remembered();
                let (remember_username, remember_password) = remembered.flags(
                    remember_choice(remember_user, forget_user),
                    remember_choice(remember_password, forget_password),
                );
                let username = username.or(remembered.username).unwrap_or_default();
                let password = password.or(remembered.password).unwrap_or_default();
                self.auth
                    .login(&username, &password, remember_username, remember_password)
                    .await
                    .context("登录失败")?;
            }
            Command::Logout => {
                self.auth.logout().context("退出登录失败")?;
                info!("✓ 已退出登录");
            }
            Command::Register {
                username,
                password,
                email,
            } => {
                self.auth
                    .register(&username, email.as_deref(), &password)
                    .await
                    .context("注册失败")?;
            }

            // ========== 文件夹 / 课程 ==========
            Command::Folders => {
                let folders = self.client.list_folders().await.context(READ_RETRY)?;
                for folder in &folders {
                    println!("{:>5}  {}", folder.folder_id, folder.name);
                }
            }
            Command::FolderAdd { name } => {
                let name = validate_folder_name(&name)?;
                let folder = self.client.create_folder(&name).await.context("新建文件夹失败")?;
                info!("✓ 文件夹已创建: #{} {}", folder.folder_id, folder.name);
            }
            Command::FolderRename { folder_id, name } => {
                let name = validate_folder_name(&name)?;
                let folder = self
                    .client
                    .update_folder(folder_id, &name)
                    .await
                    .context("修改文件夹失败")?;
                info!("✓ 文件夹已重命名: #{} {}", folder.folder_id, folder.name);
            }
            Command::Delete { target, id } => {
                let result = match target {
                    DeleteTarget::Folder => self.client.delete_folder(id).await,
                    DeleteTarget::Curriculum => self.client.delete_curriculum(id).await,
                    DeleteTarget::Problem => self.client.delete_problem(id).await,
                    DeleteTarget::Session => self.client.delete_session(id).await,
                };
                result.with_context(|| format!("删除 {:?} #{} 失败", target, id))?;
                info!("✓ 已删除 {:?} #{}", target, id);
            }
            Command::Curriculums => {
                let filter = CurriculumFilter::new(self.client.list_curriculums().await.context(READ_RETRY)?);
                print_curriculum_tree(&filter);
            }
            Command::CurriculumAdd { name, level, parent } => {
                let filter = CurriculumFilter::new(self.client.list_curriculums().await.context(READ_RETRY)?);
                filter.validate_parent(None, level, parent)?;
                let body = CurriculumCreate {
                    name: validate_curriculum_name(&name)?,
                    parent_id: parent,
                    level,
                    sort_order: filter.nodes().len() as i64,
                };
                let created = self.client.create_curriculum(&body).await.context("新建课程失败")?;
                info!("✓ 课程已创建: #{} {}", created.curriculum_id, created.name);
            }
            Command::CurriculumEdit {
                curriculum_id,
                name,
                level,
                parent,
            } => {
                let filter = CurriculumFilter::new(self.client.list_curriculums().await.context(READ_RETRY)?);
                let current = filter
                    .nodes()
                    .iter()
                    .find(|c| c.curriculum_id == curriculum_id)
                    .with_context(|| format!("课程 #{} 不存在", curriculum_id))?;
                filter.validate_parent(Some(curriculum_id), level, parent)?;
                let body = CurriculumCreate {
                    name: validate_curriculum_name(&name)?,
                    parent_id: parent,
                    level,
                    sort_order: current.sort_order,
                };
                let updated = self
                    .client
                    .update_curriculum(curriculum_id, &body)
                    .await
                    .context("修改课程失败")?;
                info!("✓ 课程已修改: #{} {}", updated.curriculum_id, updated.name);
            }

            // ========== 题目 ==========
            Command::Problems { filter } => {
                let query = self.resolve_query(filter).await?;
                let (problems, nodes) =
                    futures::future::join(self.client.list_problems(&query), self.client.list_curriculums()).await;
                if let (Some(curriculum_id), Ok(nodes)) = (query.curriculum_id, nodes) {
                    log_curriculum_scope(&CurriculumFilter::new(nodes), curriculum_id);
                }
                print_problems(&problems.context(READ_RETRY)?);
            }
            Command::ProblemAdd {
                title,
                content,
                answer,
                hints,
                folder,
                curriculum,
            } => {
                let mut draft = ProblemDraft::new(title);
                draft.folder_id = folder;
                draft.curriculum_id = self.choose_curriculum(&curriculum).await?;
                for hint in &hints {
                    draft.add_hint(hint);
                }
                draft.content_image = Some(load_image(&content).await?);
                draft.answer_image = Some(load_image(&answer).await?);

                let problem = draft.validate_for_create()?;
                self.client.create_problem(&problem).await.context("新建题目失败")?;
            }
            Command::ProblemEdit {
                problem_id,
                title,
                folder,
                curriculum,
            } => {
                let (current, nodes) = futures::future::try_join(
                    self.client.get_problem(problem_id),
                    self.client.list_curriculums(),
                )
                .await
                .context(READ_RETRY)?;
                let current = current.problem;

                // 先按题目现有课程回填三级选择，再应用本次修改
                let mut filter = CurriculumFilter::new(nodes);
                filter.select_path(current.curriculum_id);
                if let Some(path) = filter.selected_path() {
                    info!("当前课程: {}", path);
                }
                let curriculum_id = filter.amend(curriculum.subject, curriculum.unit, curriculum.subunit)?;

                let mut draft = ProblemDraft::new(title.unwrap_or(current.title));
                draft.folder_id = folder.or(current.folder_id);
                draft.curriculum_id = curriculum_id;
                let update = draft.validate_for_update()?;
                let problem = self
                    .client
                    .update_problem(problem_id, &update)
                    .await
                    .context("修改题目失败")?;
                info!("✓ 题目已修改: #{} {}", problem.problem_id, problem.title);
            }
            Command::AutoCrop {
                image,
                size,
                selection,
                display,
            } => {
                let crop = match selection {
                    Some(rect) => clamp_to(scale_to_natural(rect, display.unwrap_or(size), size)?, size)?,
                    None => {
                        let file = load_image(&image).await?;
                        let detected = self.client.auto_crop(&file).await.context("自动裁剪失败")?;
                        clamp_to(detected, size)?
                    }
                };
                println!(
                    "x={:.0} y={:.0} width={:.0} height={:.0}",
                    crop.x, crop.y, crop.width, crop.height
                );
            }

            // ========== 学习会话 / 统计 ==========
            Command::Sessions => {
                let sessions = self.client.list_sessions().await.context(READ_RETRY)?;
                for session in &sessions {
                    println!(
                        "{:>5}  {}  [{}]",
                        session.study_session_id,
                        session.name,
                        session.mode.label()
                    );
                }
            }
            Command::SessionAdd {
                name,
                mode,
                folders,
                curriculums,
            } => {
                let mut folder_ids = Vec::new();
                for id in folders {
                    toggle_selection(&mut folder_ids, id);
                }
                let mut curriculum_ids = Vec::new();
                for id in curriculums {
                    toggle_selection(&mut curriculum_ids, id);
                }
                let body = validate_session(&name, mode.unwrap_or_default(), curriculum_ids, folder_ids)?;
                let session = self.client.create_session(&body).await.context("新建学习会话失败")?;
                info!("✓ 学习会话已创建: #{} {}", session.study_session_id, session.name);
            }
            Command::Stats => {
                let stats = self.client.statistics().await.context(READ_RETRY)?;
                println!(
                    "题目 {}  已做 {}  正确 {}  正确率 {:.1}%",
                    stats.total_problems, stats.solved_count, stats.correct_count, stats.correct_rate
                );
                for item in stats.by_folder.iter().chain(&stats.by_curriculum) {
                    println!(
                        "  {:<20} {}/{} 正确率 {:.1}%",
                        truncate_text(&item.name, 20),
                        item.solved,
                        item.total,
                        item.correct_rate
                    );
                }
            }

            // ========== 做题 ==========
            Command::Solve { session, filter } => {
                let mut flow = self.solve_flow();
                match session {
                    Some(id) => {
                        let sessions = self.client.list_sessions().await.context(READ_RETRY)?;
                        let session = sessions
                            .iter()
                            .find(|s| s.study_session_id == id)
                            .with_context(|| format!("学习会话 #{} 不存在", id))?;
                        flow.start_session(session).await?;
                    }
                    None => {
                        let query = self.resolve_query(filter).await?;
                        flow.start_simple(&query).await?;
                    }
                }
                solve_session::run(&mut flow).await?;
            }
            Command::Resume => {
                let mut flow = self.solve_flow();
                match flow.resume().await? {
                    Some(_) => solve_session::run(&mut flow).await?,
                    None => info!("没有保存的做题进度"),
                }
            }

            // ========== 排序 ==========
            Command::Reorder {
                resource,
                active,
                over,
            } => {
                let event = DragEnd {
                    active,
                    over: Some(over),
                };
                match resource {
                    ReorderResource::Folders => {
                        let items = self.client.list_folders().await.context(READ_RETRY)?;
                        let names = self.reorder(resource, items, event).await;
                        print_order(names.iter().map(|f| (f.folder_id, f.name.as_str())));
                    }
                    ReorderResource::Curriculums => {
                        let items = self.client.list_curriculums().await.context(READ_RETRY)?;
                        let names = self.reorder(resource, items, event).await;
                        print_order(names.iter().map(|c| (c.curriculum_id, c.name.as_str())));
                    }
                    ReorderResource::Problems => {
                        let query = self.resolve_query(FilterArgs::default()).await?;
                        let items = self.client.list_problems(&query).await.context(READ_RETRY)?;
                        let names = self.reorder(resource, items, event).await;
                        print_order(names.iter().map(|p| (p.problem_id, p.title.as_str())));
                    }
                }
            }
        }
        Ok(())
    }

    fn solve_flow(&self) -> SolveFlow {
        SolveFlow::new(Arc::new(self.client.clone()), PlaylistStore::new(self.store.clone()))
    }

    /// 没有给出筛选时沿用上次的选择，给出时记住它
    async fn resolve_query(&self, filter: FilterArgs) -> Result<ProblemQuery> {
        let preferences = Preferences::new(self.store.clone());
        if filter.is_empty() {
            let last = preferences.last_selection();
            return Ok(ProblemQuery {
                status: last.status,
                folder_id: last.folder_id,
                curriculum_id: last.curriculum_id,
                sort_by: self.config.default_sort,
            });
        }

        let curriculum_id = self.choose_curriculum(&filter.curriculum).await?;
        let query = filter.to_query(curriculum_id, self.config.default_sort);
        let selection = LastSelection {
            folder_id: query.folder_id,
            curriculum_id: query.curriculum_id,
            status: query.status,
        };
        if let Err(e) = preferences.remember(&selection) {
            warn!("⚠️ 保存筛选条件失败: {}", e);
        }
        Ok(query)
    }

    /// 按 科目 → 单元 → 小单元 联动选出课程，都没给出时为 None（全部）
    async fn choose_curriculum(&self, args: &CurriculumArgs) -> Result<Option<i64>> {
        if args.is_empty() {
            return Ok(None);
        }
        let mut filter = CurriculumFilter::new(self.client.list_curriculums().await.context(READ_RETRY)?);
        Ok(filter.choose(args.subject, args.unit, args.subunit)?)
    }

    /// 本地先排好并打印，再等待后台保存结束（进程退出前）
    async fn reorder<T: Rankable>(&self, resource: ReorderResource, items: Vec<T>, event: DragEnd) -> Vec<T> {
        let backend: Arc<dyn ReorderBackend> = Arc::new(self.client.clone());
        let mut list = ListReorder::new(resource, items, backend);
        let handle = list.on_drag_end(event);
        let ordered = list.items().to_vec();

        match handle {
            Some(handle) => {
                if let Err(e) = handle.await {
                    warn!("⚠️ 排序任务异常结束: {}", e);
                }
            }
            None => info!("顺序未变化"),
        }
        ordered
    }
}

const READ_RETRY: &str = "读取失败，请稍后重新执行该命令";

fn requires_login(command: &Command) -> bool {
    !matches!(
        command,
        Command::Login { .. } | Command::Register { .. } | Command::Logout
    )
}

async fn load_image(path: &str) -> Result<ImageFile> {
    ImageFile::from_path(Path::new(path))
        .await
        .with_context(|| format!("读取图片失败: {}", path))
}

/// 打印选中课程的完整路径和覆盖的节点数
fn log_curriculum_scope(filter: &CurriculumFilter, curriculum_id: i64) {
    match filter.ancestor_chain(curriculum_id) {
        Some(chain) => {
            let path: Vec<&str> = chain.iter().map(|c| c.name.as_str()).collect();
            info!(
                "课程: {}（含 {} 个节点）",
                path.join(" > "),
                filter.descendants_of(curriculum_id).len()
            );
        }
        None => warn!("⚠️ 课程 #{} 不存在", curriculum_id),
    }
}

fn print_curriculum_tree(filter: &CurriculumFilter) {
    for subject in filter.level1_options() {
        println!("{:>5}  {}", subject.curriculum_id, subject.name);
        for unit in filter.nodes().iter().filter(|c| c.parent_id == Some(subject.curriculum_id)) {
            println!("{:>5}    {}", unit.curriculum_id, unit.name);
            for sub in filter.nodes().iter().filter(|c| c.parent_id == Some(unit.curriculum_id)) {
                println!("{:>5}      {}", sub.curriculum_id, sub.name);
            }
        }
    }
}

fn print_problems(problems: &[Problem]) {
    if problems.is_empty() {
        println!("没有符合条件的题目");
    }
    for problem in problems {
        println!(
            "{:>5}  {:<30} {:?}  做过 {} 次  正确率 {:.0}%",
            problem.problem_id,
            truncate_text(&problem.title, 30),
            problem.latest_status,
            problem.solve_count,
            problem.correct_rate
        );
    }
}

fn print_order<'a>(items: impl Iterator<Item = (i64, &'a str)>) {
    for (index, (id, name)) in items.enumerate() {
        println!("{:>3}. #{} {}", index, id, name);
    }
}
