// ==========================================
// 用户信息导入 - 用户信息 Repository Trait
// ==========================================
// 职责: 定义用户信息持久化接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::user_info::{StoredUserInfo, UserInfo};
use crate::repository::error::RepositoryResult;
use std::sync::Arc;

// ==========================================
// UserInfoRepository Trait
// ==========================================
// 用途: 导入管道的持久化协作者（构造时注入）
// 实现者: UserInfoRepositoryImpl（使用 rusqlite）
pub trait UserInfoRepository: Send + Sync {
    /// 插入单条用户信息
    ///
    /// # 参数
    /// - batch_id: 导入批次 ID
    /// - record: 用户信息
    fn insert(&self, batch_id: &str, record: &UserInfo) -> RepositoryResult<()>;

    /// 批量插入用户信息
    ///
    /// 默认逐条调用 `insert`；支持事务的实现应整体提交/回滚。
    ///
    /// # 返回
    /// - Ok(usize): 插入条数
    fn insert_batch(&self, batch_id: &str, records: &[UserInfo]) -> RepositoryResult<usize> {
        for record in records {
            self.insert(batch_id, record)?;
        }
        Ok(records.len())
    }

    /// 已落库总条数
    fn count(&self) -> RepositoryResult<usize>;

    /// 按批次查询（按插入顺序）
    fn list_by_batch(&self, batch_id: &str) -> RepositoryResult<Vec<StoredUserInfo>>;
}

// 共享仓储（AppState 持有 Arc，导入管道按值持有）
impl<T> UserInfoRepository for Arc<T>
where
    T: UserInfoRepository + ?Sized,
{
    fn insert(&self, batch_id: &str, record: &UserInfo) -> RepositoryResult<()> {
        (**self).insert(batch_id, record)
    }

    fn insert_batch(&self, batch_id: &str, records: &[UserInfo]) -> RepositoryResult<usize> {
        (**self).insert_batch(batch_id, records)
    }

    fn count(&self) -> RepositoryResult<usize> {
        (**self).count()
    }

    fn list_by_batch(&self, batch_id: &str) -> RepositoryResult<Vec<StoredUserInfo>> {
        (**self).list_by_batch(batch_id)
    }
}
