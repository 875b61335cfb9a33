// ==========================================
// 用户信息导入 - 用户信息 Repository 实现
// ==========================================
// 职责: 实现用户信息数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::domain::user_info::{StoredUserInfo, UserInfo};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::user_info_repo::UserInfoRepository;
use chrono::Utc;
use rusqlite::{params, Connection, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};

const INSERT_SQL: &str = r#"
    INSERT INTO user_info (batch_id, user_name, age, address, phone_num, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

// ==========================================
// UserInfoRepositoryImpl
// ==========================================
pub struct UserInfoRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl UserInfoRepositoryImpl {
    /// 创建新的 Repository 实例（自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 Repository
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA 并建表（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            init_schema(&guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在事务中批量插入
    fn insert_batch_tx(
        tx: &Transaction,
        batch_id: &str,
        records: &[UserInfo],
    ) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(INSERT_SQL)?;
        let created_at = Utc::now();

        let mut count = 0;
        for record in records {
            stmt.execute(params![
                batch_id,
                record.name,
                record.age,
                record.address,
                record.phone_number,
                created_at,
            ])?;
            count += 1;
        }

        Ok(count)
    }
}

impl UserInfoRepository for UserInfoRepositoryImpl {
    fn insert(&self, batch_id: &str, record: &UserInfo) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            INSERT_SQL,
            params![
                batch_id,
                record.name,
                record.age,
                record.address,
                record.phone_number,
                Utc::now(),
            ],
        )?;
        Ok(())
    }

    /// 批量插入（事务化，任一条失败整批回滚）
    fn insert_batch(&self, batch_id: &str, records: &[UserInfo]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        // 出错时 tx 被 drop，自动回滚
        let count = Self::insert_batch_tx(&tx, batch_id, records)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM user_info", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn list_by_batch(&self, batch_id: &str) -> RepositoryResult<Vec<StoredUserInfo>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, batch_id, user_name, age, address, phone_num, created_at
            FROM user_info
            WHERE batch_id = ?1
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map(params![batch_id], |row| {
            Ok(StoredUserInfo {
                id: row.get(0)?,
                batch_id: row.get(1)?,
                user: UserInfo {
                    name: row.get(2)?,
                    age: row.get(3)?,
                    address: row.get(4)?,
                    phone_number: row.get(5)?,
                },
                created_at: row.get(6)?,
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}
