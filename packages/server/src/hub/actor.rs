//! The hub task.

use std::collections::HashMap;

use tokio::{sync::mpsc, task::JoinHandle};

use crate::domain::{Connection, ConnectionId, Frame, SendError};

use super::handle::{HubCommand, HubHandle, HubStats};

/// Single owner of the membership set.
///
/// Register, unregister, broadcast and targeted sends are applied strictly one
/// at a time, so a fan-out always sees a membership set that no one else is
/// mutating.
pub struct Hub {
    members: HashMap<ConnectionId, Connection>,
    commands: mpsc::UnboundedReceiver<HubCommand>,
    stats: HubStats,
}

impl Hub {
    /// Create a hub and the handle that feeds it. The hub does nothing until
    /// [`Hub::run`] is polled.
    pub fn new() -> (Self, HubHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let hub = Self {
            members: HashMap::new(),
            commands: rx,
            stats: HubStats::default(),
        };
        (hub, HubHandle::new(tx))
    }

    /// Create a hub and run it on its own task.
    pub fn spawn() -> (HubHandle, JoinHandle<()>) {
        let (hub, handle) = Self::new();
        let task = tokio::spawn(hub.run());
        (handle, task)
    }

    /// Apply commands until every [`HubHandle`] is dropped, then release the
    /// remaining members.
    pub async fn run(mut self) {
        tracing::info!("Hub started");

        while let Some(command) = self.commands.recv().await {
            self.apply(command);
        }

        let remaining: Vec<ConnectionId> = self.members.keys().copied().collect();
        for id in remaining {
            self.unregister(id);
        }
        tracing::info!("Hub stopped");
    }

    fn apply(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register(connection) => self.register(connection),
            HubCommand::Unregister(id) => self.unregister(id),
            HubCommand::Broadcast(frame) => self.broadcast(frame),
            HubCommand::SendTo(id, frame) => self.send_to(id, frame),
            HubCommand::Stats(reply) => {
                let stats = HubStats {
                    connections: self.members.len(),
                    ..self.stats
                };
                // The requester may have given up waiting.
                let _ = reply.send(stats);
            }
        }
    }

    fn register(&mut self, connection: Connection) {
        let id = connection.id();
        if self.members.contains_key(&id) {
            tracing::debug!("Connection '{}' is already registered, ignoring", id);
            return;
        }
        self.members.insert(id, connection);
        self.stats.registered_total += 1;
        tracing::info!(
            "Connection '{}' registered ({} connected)",
            id,
            self.members.len()
        );
    }

    fn unregister(&mut self, id: ConnectionId) {
        let Some(connection) = self.members.remove(&id) else {
            tracing::debug!("Connection '{}' is not registered, nothing to release", id);
            return;
        };
        connection.release();
        self.stats.released_total += 1;
        tracing::info!(
            "Connection '{}' unregistered ({} connected)",
            id,
            self.members.len()
        );
    }

    fn broadcast(&mut self, frame: Frame) {
        tracing::debug!(
            "Broadcasting {} byte frame to {} connection(s)",
            frame.len(),
            self.members.len()
        );

        let failed: Vec<(ConnectionId, SendError)> = self
            .members
            .iter()
            .filter_map(|(id, connection)| connection.send(frame.clone()).err().map(|e| (*id, e)))
            .collect();

        for (id, error) in failed {
            self.evict(id, error);
        }
    }

    fn send_to(&mut self, id: ConnectionId, frame: Frame) {
        let Some(connection) = self.members.get(&id) else {
            tracing::warn!("Connection '{}' not found, dropping targeted frame", id);
            return;
        };
        if let Err(e) = connection.send(frame) {
            self.evict(id, e);
        }
    }

    fn evict(&mut self, id: ConnectionId, error: SendError) {
        if error == SendError::BufferFull {
            self.stats.dropped_frames += 1;
        }
        tracing::warn!("Failed to deliver to connection '{}': {}", id, error);
        self.unregister(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::Outbox, hub::HubError};
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - Hub の登録・登録解除・ブロードキャストの直列化
    // - 接続単位の送信失敗が他の接続に影響しないこと
    //
    // 【どのようなシナリオをテストするか】
    // 1. 同一接続の二重登録（冪等性）
    // 2. 二重の登録解除（トランスポート解放は一度だけ）
    // 3. 失敗する接続を含むブロードキャスト
    // 4. 登録とブロードキャストの順序保証
    // 5. バックプレッシャーによる破棄と登録解除
    // ========================================

    fn drain(outbox: &mut Outbox) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Ok(frame) = outbox.try_recv() {
            frames.push(frame);
        }
        frames
    }

    #[tokio::test]
    async fn test_register_adds_member() {
        // テスト項目: 登録した接続がメンバーになる
        // given (前提条件):
        let (hub, _task) = Hub::spawn();
        let (conn, _outbox) = Connection::open(8);

        // when (操作):
        hub.register(conn).unwrap();

        // then (期待する結果):
        let stats = hub.stats().await.unwrap();
        assert_eq!(stats.connections, 1);
        assert_eq!(stats.registered_total, 1);
    }

    #[tokio::test]
    async fn test_register_same_connection_twice_is_idempotent() {
        // テスト項目: 同じ接続を二度登録してもメンバー数は変わらない
        // given (前提条件):
        let (hub, _task) = Hub::spawn();
        let (tx, _outbox) = mpsc::channel(8);
        let id = ConnectionId::generate();
        hub.register(Connection::new(id, tx.clone())).unwrap();
        let before = hub.stats().await.unwrap();

        // when (操作):
        hub.register(Connection::new(id, tx)).unwrap();

        // then (期待する結果):
        let after = hub.stats().await.unwrap();
        assert_eq!(before.connections, 1);
        assert_eq!(after.connections, 1);
        assert_eq!(after.registered_total, 1);
    }

    #[tokio::test]
    async fn test_unregister_twice_releases_once() {
        // テスト項目: 二度の登録解除でトランスポートの解放は一度だけ行われる
        // given (前提条件):
        let (hub, _task) = Hub::spawn();
        let (conn, mut outbox) = Connection::open(8);
        let id = conn.id();
        hub.register(conn).unwrap();

        // when (操作):
        hub.unregister(id).unwrap();
        hub.unregister(id).unwrap();

        // then (期待する結果):
        let stats = hub.stats().await.unwrap();
        assert_eq!(stats.connections, 0);
        assert_eq!(stats.released_total, 1);
        assert_eq!(outbox.recv().await, None);
    }

    #[tokio::test]
    async fn test_unregister_unknown_connection_is_noop() {
        // テスト項目: 未登録の接続の登録解除は何もしない
        // given (前提条件):
        let (hub, _task) = Hub::spawn();
        let (conn, _outbox) = Connection::open(8);
        hub.register(conn).unwrap();

        // when (操作):
        hub.unregister(ConnectionId::generate()).unwrap();

        // then (期待する結果):
        let stats = hub.stats().await.unwrap();
        assert_eq!(stats.connections, 1);
        assert_eq!(stats.released_total, 0);
    }

    #[tokio::test]
    async fn test_concurrent_unregister_releases_once() {
        // テスト項目: 複数タスクから同時に登録解除しても解放は一度だけ
        // given (前提条件):
        let (hub, _task) = Hub::spawn();
        let (conn, _outbox) = Connection::open(8);
        let id = conn.id();
        hub.register(conn).unwrap();

        // when (操作):
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let hub = hub.clone();
                tokio::spawn(async move { hub.unregister(id) })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        // then (期待する結果):
        let stats = hub.stats().await.unwrap();
        assert_eq!(stats.connections, 0);
        assert_eq!(stats.released_total, 1);
    }

    #[tokio::test]
    async fn test_broadcast_isolates_failing_connection() {
        // テスト項目: 送信に失敗する接続があっても他の接続には配信され、失敗した接続は登録解除される
        // given (前提条件):
        let (hub, _task) = Hub::spawn();
        let (healthy, mut healthy_outbox) = Connection::open(8);
        let (broken, broken_outbox) = Connection::open(8);
        drop(broken_outbox);
        hub.register(healthy).unwrap();
        hub.register(broken).unwrap();

        // when (操作):
        hub.broadcast(Frame::text("P")).unwrap();

        // then (期待する結果):
        let stats = hub.stats().await.unwrap();
        assert_eq!(stats.connections, 1);
        assert_eq!(stats.released_total, 1);
        assert_eq!(drain(&mut healthy_outbox), vec![Frame::text("P")]);
    }

    #[tokio::test]
    async fn test_late_registration_does_not_receive_earlier_broadcast() {
        // テスト項目: [register(A), broadcast(P1), register(B), broadcast(P2)] の順で、B は P1 を受信しない
        // given (前提条件):
        let (hub, _task) = Hub::spawn();
        let (a, mut a_outbox) = Connection::open(8);
        let (b, mut b_outbox) = Connection::open(8);

        // when (操作):
        hub.register(a).unwrap();
        hub.broadcast(Frame::text("P1")).unwrap();
        hub.register(b).unwrap();
        hub.broadcast(Frame::text("P2")).unwrap();
        hub.stats().await.unwrap();

        // then (期待する結果):
        assert_eq!(
            drain(&mut a_outbox),
            vec![Frame::text("P1"), Frame::text("P2")]
        );
        assert_eq!(drain(&mut b_outbox), vec![Frame::text("P2")]);
    }

    #[tokio::test]
    async fn test_full_buffer_drops_frame_and_unregisters() {
        // テスト項目: 容量 N のバッファに N+1 件届くと N+1 件目は破棄され、接続は登録解除される
        // given (前提条件):
        let capacity = 2;
        let (hub, _task) = Hub::spawn();
        let (slow, mut slow_outbox) = Connection::open(capacity);
        let (fast, mut fast_outbox) = Connection::open(16);
        hub.register(slow).unwrap();
        hub.register(fast).unwrap();

        // when (操作):
        for i in 0..=capacity {
            hub.broadcast(Frame::text(format!("m{}", i))).unwrap();
        }

        // then (期待する結果):
        let stats = hub.stats().await.unwrap();
        assert_eq!(stats.connections, 1);
        assert_eq!(stats.dropped_frames, 1);
        assert_eq!(stats.released_total, 1);

        assert_eq!(slow_outbox.recv().await, Some(Frame::text("m0")));
        assert_eq!(slow_outbox.recv().await, Some(Frame::text("m1")));
        assert_eq!(slow_outbox.recv().await, None);

        assert_eq!(drain(&mut fast_outbox).len(), capacity + 1);
    }

    #[tokio::test]
    async fn test_evicted_connection_misses_later_broadcasts() {
        // テスト項目: 登録解除された接続には以降のブロードキャストが届かない
        // given (前提条件):
        let (hub, _task) = Hub::spawn();
        let (a, mut a_outbox) = Connection::open(8);
        let (b, mut b_outbox) = Connection::open(8);
        let b_id = b.id();
        hub.register(a).unwrap();
        hub.register(b).unwrap();

        // when (操作):
        hub.unregister(b_id).unwrap();
        hub.broadcast(Frame::text("after")).unwrap();
        hub.stats().await.unwrap();

        // then (期待する結果):
        assert_eq!(drain(&mut a_outbox), vec![Frame::text("after")]);
        assert_eq!(b_outbox.recv().await, None);
    }

    #[tokio::test]
    async fn test_send_to_delivers_only_to_target() {
        // テスト項目: send_to は指定した接続にだけ配信される
        // given (前提条件):
        let (hub, _task) = Hub::spawn();
        let (a, mut a_outbox) = Connection::open(8);
        let (b, mut b_outbox) = Connection::open(8);
        let a_id = a.id();
        hub.register(a).unwrap();
        hub.register(b).unwrap();

        // when (操作):
        hub.send_to(a_id, Frame::text("only-a")).unwrap();
        hub.stats().await.unwrap();

        // then (期待する結果):
        assert_eq!(drain(&mut a_outbox), vec![Frame::text("only-a")]);
        assert!(drain(&mut b_outbox).is_empty());
    }

    #[tokio::test]
    async fn test_send_to_failure_unregisters_target() {
        // テスト項目: send_to の失敗で対象の接続が登録解除される
        // given (前提条件):
        let (hub, _task) = Hub::spawn();
        let (conn, outbox) = Connection::open(8);
        let id = conn.id();
        hub.register(conn).unwrap();
        drop(outbox);

        // when (操作):
        hub.send_to(id, Frame::text("lost")).unwrap();

        // then (期待する結果):
        let stats = hub.stats().await.unwrap();
        assert_eq!(stats.connections, 0);
        assert_eq!(stats.released_total, 1);
    }

    #[tokio::test]
    async fn test_send_to_unknown_connection_is_noop() {
        // テスト項目: 未登録の接続への send_to は何もしない
        // given (前提条件):
        let (hub, _task) = Hub::spawn();

        // when (操作):
        hub.send_to(ConnectionId::generate(), Frame::text("nobody")).unwrap();

        // then (期待する結果):
        let stats = hub.stats().await.unwrap();
        assert_eq!(stats, HubStats::default());
    }

    #[tokio::test]
    async fn test_dropping_all_handles_stops_hub_and_releases_members() {
        // テスト項目: 全てのハンドルが破棄されると Hub は停止し、残りの接続を解放する
        // given (前提条件):
        let (hub, task) = Hub::spawn();
        let (conn, mut outbox) = Connection::open(8);
        hub.register(conn).unwrap();
        hub.stats().await.unwrap();

        // when (操作):
        drop(hub);

        // then (期待する結果):
        task.await.unwrap();
        assert_eq!(outbox.recv().await, None);
    }

    #[tokio::test]
    async fn test_handle_reports_closed_after_hub_stops() {
        // テスト項目: Hub 停止後のコマンド送信は HubError::Closed を返す
        // given (前提条件):
        let (hub, task) = Hub::spawn();
        task.abort();
        let _ = task.await;
        let (conn, _outbox) = Connection::open(8);

        // when (操作):
        let result = hub.register(conn);

        // then (期待する結果):
        assert_eq!(result, Err(HubError::Closed));
        assert_eq!(hub.stats().await, Err(HubError::Closed));
    }
}
