//! 课程三级联动筛选 - 业务能力层
//!
//! 科目 → 单元 → 小单元，下级选项由上级的选择决定

use crate::error::{AppResult, ValidationError};
use crate::models::Curriculum;
use std::collections::{HashMap, HashSet};

/// 课程三级联动筛选
#[derive(Debug, Clone, Default)]
pub struct CurriculumFilter {
    nodes: Vec<Curriculum>,
    level1: Option<i64>,
    level2: Option<i64>,
    level3: Option<i64>,
}

impl CurriculumFilter {
    pub fn new(nodes: Vec<Curriculum>) -> Self {
        Self {
            nodes,
            ..Default::default()
        }
    }

    pub fn nodes(&self) -> &[Curriculum] {
        &self.nodes
    }

    /// 当前三级选择
    pub fn selection(&self) -> (Option<i64>, Option<i64>, Option<i64>) {
        (self.level1, self.level2, self.level3)
    }

    pub fn level1_options(&self) -> Vec<&Curriculum> {
        self.nodes.iter().filter(|c| c.level == 1).collect()
    }

    /// 未选科目时为空（控件禁用）
    pub fn level2_options(&self) -> Vec<&Curriculum> {
        self.children_at(self.level1, 2)
    }

    /// 未选单元时为空（控件禁用）
    pub fn level3_options(&self) -> Vec<&Curriculum> {
        self.children_at(self.level2, 3)
    }

    fn children_at(&self, parent: Option<i64>, level: u8) -> Vec<&Curriculum> {
        match parent {
            Some(parent) => self
                .nodes
                .iter()
                .filter(|c| c.level == level && c.parent_id == Some(parent))
                .collect(),
            None => Vec::new(),
        }
    }

    /// 选择科目，清空单元和小单元
    pub fn select_level1(&mut self, id: Option<i64>) {
        self.level1 = id;
        self.level2 = None;
        self.level3 = None;
    }

    /// 选择单元，清空小单元
    pub fn select_level2(&mut self, id: Option<i64>) {
        self.level2 = id;
        self.level3 = None;
    }

    pub fn select_level3(&mut self, id: Option<i64>) {
        self.level3 = id;
    }

    /// 实际用于查询的课程：选到哪一级就用哪一级，全未选为 None（全部）
    pub fn effective(&self) -> Option<i64> {
        self.level3.or(self.level2).or(self.level1)
    }

    /// 依次选择科目、单元、小单元，返回 `effective()`
    ///
    /// 每一级只能从当前可选项中选择，上级未选时下级不可选
    pub fn choose(
        &mut self,
        subject: Option<i64>,
        unit: Option<i64>,
        subunit: Option<i64>,
    ) -> AppResult<Option<i64>> {
        self.select_level1(None);
        if let Some(id) = subject {
            check_option(&self.level1_options(), "subject", id)?;
            self.select_level1(Some(id));
        }
        if let Some(id) = unit {
            check_option(&self.level2_options(), "unit", id)?;
            self.select_level2(Some(id));
        }
        if let Some(id) = subunit {
            check_option(&self.level3_options(), "subunit", id)?;
            self.select_level3(Some(id));
        }
        Ok(self.effective())
    }

    /// 在已有选择上修改
    ///
    /// 从给出的最上一级开始重选，更上级保持原样；什么都没给出时保持原选择
    pub fn amend(
        &mut self,
        subject: Option<i64>,
        unit: Option<i64>,
        subunit: Option<i64>,
    ) -> AppResult<Option<i64>> {
        let (level1, level2, _) = self.selection();
        match (subject, unit, subunit) {
            (Some(_), _, _) => self.choose(subject, unit, subunit),
            (None, Some(_), _) => self.choose(level1, unit, subunit),
            (None, None, Some(_)) => self.choose(level1, level2, subunit),
            (None, None, None) => Ok(self.effective()),
        }
    }

    /// 当前选择的名称路径，例如 `数学 > 函数`
    pub fn selected_path(&self) -> Option<String> {
        let names: Vec<&str> = [self.level1, self.level2, self.level3]
            .iter()
            .flatten()
            .filter_map(|id| self.nodes.iter().find(|c| c.curriculum_id == *id))
            .map(|c| c.name.as_str())
            .collect();
        (!names.is_empty()).then(|| names.join(" > "))
    }

    /// 编辑已有数据时，根据最深的课程 ID 反推三级选择
    ///
    /// 找不到 ID 或父链断开时三级全部清空
    pub fn select_path(&mut self, target: Option<i64>) {
        self.level1 = None;
        self.level2 = None;
        self.level3 = None;

        let Some(target) = target else {
            return;
        };
        let path: Vec<(u8, i64)> = match self.ancestor_chain(target) {
            Some(chain) => chain.iter().map(|n| (n.level, n.curriculum_id)).collect(),
            None => return,
        };
        for (level, curriculum_id) in path {
            match level {
                1 => self.level1 = Some(curriculum_id),
                2 => self.level2 = Some(curriculum_id),
                3 => self.level3 = Some(curriculum_id),
                _ => {}
            }
        }
    }

    /// 从目标节点沿父节点向上，直到没有父节点的一级节点
    ///
    /// 返回顺序为 一级 → 目标
    pub fn ancestor_chain(&self, target: i64) -> Option<Vec<&Curriculum>> {
        let by_id: HashMap<i64, &Curriculum> =
            self.nodes.iter().map(|c| (c.curriculum_id, c)).collect();

        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = *by_id.get(&target)?;

        loop {
            if !visited.insert(current.curriculum_id) {
                return None;
            }
            chain.push(current);
            match current.parent_id {
                Some(parent_id) => current = *by_id.get(&parent_id)?,
                None if current.level == 1 => break,
                None => return None,
            }
        }

        chain.reverse();
        Some(chain)
    }

    /// 节点自身及其所有子孙节点
    pub fn descendants_of(&self, root: i64) -> HashSet<i64> {
        let mut result = HashSet::from([root]);
        let mut frontier = vec![root];
        while let Some(parent) = frontier.pop() {
            for child in self.nodes.iter().filter(|c| c.parent_id == Some(parent)) {
                if result.insert(child.curriculum_id) {
                    frontier.push(child.curriculum_id);
                }
            }
        }
        result
    }

    /// 校验课程表单的父节点
    ///
    /// 层级只能是 1 到 3；一级节点不能有父节点，N 级节点的父节点必须是 N-1 级，不能以自身为父
    pub fn validate_parent(
        &self,
        node_id: Option<i64>,
        level: u8,
        parent_id: Option<i64>,
    ) -> AppResult<()> {
        if !(1..=3).contains(&level) {
            return Err(ValidationError::InvalidArgument {
                name: "level".to_string(),
                value: level.to_string(),
            }
            .into());
        }

        let invalid = |parent_id: i64, reason: &'static str| -> AppResult<()> {
            Err(ValidationError::InvalidParent {
                node_id,
                parent_id,
                reason,
            }
            .into())
        };

        match parent_id {
            None if level == 1 => Ok(()),
            None => Err(ValidationError::MissingField { field: "上级课程" }.into()),
            Some(parent_id) if Some(parent_id) == node_id => invalid(parent_id, "不能以自身为上级"),
            Some(parent_id) if level == 1 => invalid(parent_id, "一级课程不能有上级"),
            Some(parent_id) => match self.nodes.iter().find(|c| c.curriculum_id == parent_id) {
                None => invalid(parent_id, "上级课程不存在"),
                Some(parent) if parent.level + 1 != level => {
                    invalid(parent_id, "上级课程层级不匹配")
                }
                Some(_) => Ok(()),
            },
        }
    }
}

fn check_option(options: &[&Curriculum], name: &str, id: i64) -> AppResult<()> {
    if options.iter().any(|c| c.curriculum_id == id) {
        return Ok(());
    }
    Err(ValidationError::InvalidArgument {
        name: name.to_string(),
        value: id.to_string(),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, parent: Option<i64>, level: u8) -> Curriculum {
        Curriculum {
            curriculum_id: id,
            name: format!("c{}", id),
            parent_id: parent,
            level,
            sort_order: 0,
            created_at: String::new(),
        }
    }

    /// 数学(1) → 函数(10) → 二次函数(100)；英语(2) → 语法(20)
    fn tree() -> CurriculumFilter {
        CurriculumFilter::new(vec![
            node(1, None, 1),
            node(2, None, 1),
            node(10, Some(1), 2),
            node(11, Some(1), 2),
            node(20, Some(2), 2),
            node(100, Some(10), 3),
            node(101, Some(10), 3),
        ])
    }

    fn ids(options: Vec<&Curriculum>) -> Vec<i64> {
        options.iter().map(|c| c.curriculum_id).collect()
    }

    #[test]
    fn test_options_follow_selection() {
        let mut filter = tree();
        assert_eq!(ids(filter.level1_options()), vec![1, 2]);
        assert!(filter.level2_options().is_empty());
        assert!(filter.level3_options().is_empty());

        filter.select_level1(Some(1));
        assert_eq!(ids(filter.level2_options()), vec![10, 11]);
        assert!(filter.level3_options().is_empty());

        filter.select_level2(Some(10));
        assert_eq!(ids(filter.level3_options()), vec![100, 101]);
    }

    #[test]
    fn test_selecting_ancestor_clears_descendants() {
        let mut filter = tree();
        filter.select_level1(Some(1));
        filter.select_level2(Some(10));
        filter.select_level3(Some(100));
        assert_eq!(filter.effective(), Some(100));

        filter.select_level2(Some(11));
        assert_eq!(filter.selection(), (Some(1), Some(11), None));

        filter.select_level3(Some(100));
        filter.select_level1(Some(2));
        assert_eq!(filter.selection(), (Some(2), None, None));
        assert_eq!(filter.effective(), Some(2));

        filter.select_level1(None);
        assert_eq!(filter.effective(), None);
    }

    #[test]
    fn test_select_path_from_deepest_node() {
        let mut filter = tree();
        filter.select_path(Some(100));
        assert_eq!(filter.selection(), (Some(1), Some(10), Some(100)));

        filter.select_path(Some(20));
        assert_eq!(filter.selection(), (Some(2), Some(20), None));
    }

    #[test]
    fn test_choose_walks_the_cascade() {
        let mut filter = tree();
        assert_eq!(filter.choose(Some(1), Some(10), None).unwrap(), Some(10));
        assert_eq!(filter.selected_path().as_deref(), Some("c1 > c10"));
        assert_eq!(filter.choose(None, None, None).unwrap(), None);
        assert_eq!(filter.selected_path(), None);

        // 单元 20 属于英语，不在数学的可选项里
        assert!(filter.choose(Some(1), Some(20), None).is_err());
        // 未选科目时单元不可选
        assert!(filter.choose(None, Some(10), None).is_err());
        assert!(filter.choose(Some(1), None, Some(100)).is_err());
    }

    #[test]
    fn test_amend_keeps_upper_levels_of_existing_path() {
        let mut filter = tree();
        filter.select_path(Some(100));
        assert_eq!(filter.amend(None, None, None).unwrap(), Some(100));

        assert_eq!(filter.amend(None, Some(11), None).unwrap(), Some(11));
        assert_eq!(filter.selection(), (Some(1), Some(11), None));

        filter.select_path(Some(100));
        assert_eq!(filter.amend(None, None, Some(101)).unwrap(), Some(101));
        assert_eq!(filter.amend(Some(2), None, None).unwrap(), Some(2));
        assert!(filter.amend(None, Some(10), None).is_err());
    }

    #[test]
    fn test_select_path_unknown_id_clears_everything() {
        let mut filter = tree();
        filter.select_path(Some(100));
        filter.select_path(Some(999));
        assert_eq!(filter.selection(), (None, None, None));
    }

    #[test]
    fn test_ancestor_chain_rejects_cycles() {
        let filter = CurriculumFilter::new(vec![node(5, Some(6), 2), node(6, Some(5), 2)]);
        assert!(filter.ancestor_chain(5).is_none());
    }

    #[test]
    fn test_descendants_cover_whole_subtree() {
        let filter = tree();
        assert_eq!(filter.descendants_of(1), HashSet::from([1, 10, 11, 100, 101]));
        assert_eq!(filter.descendants_of(101), HashSet::from([101]));
    }

    #[test]
    fn test_validate_parent() {
        let filter = tree();
        assert!(filter.validate_parent(None, 1, None).is_ok());
        assert!(filter.validate_parent(Some(11), 2, Some(1)).is_ok());
        assert!(filter.validate_parent(Some(10), 2, Some(10)).is_err());
        assert!(filter.validate_parent(None, 3, Some(1)).is_err());
        assert!(filter.validate_parent(None, 1, Some(2)).is_err());
        assert!(filter.validate_parent(None, 2, None).is_err());
    }

    #[test]
    fn test_level_outside_one_to_three_is_rejected() {
        let filter = tree();
        for level in [0, 4] {
            let err = filter.validate_parent(None, level, None).unwrap_err();
            assert!(matches!(
                err,
                crate::error::AppError::Validation(ValidationError::InvalidArgument { .. })
            ));
        }
    }

    #[test]
    fn test_select_path_then_change_unit_keeps_subject() {
        let mut filter = tree();
        filter.select_path(Some(101));
        assert_eq!(filter.effective(), Some(101));

        filter.select_level2(Some(11));
        assert_eq!(filter.selection(), (Some(1), Some(11), None));
        assert_eq!(filter.effective(), Some(11));
    }
}
