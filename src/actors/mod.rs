// Actor模块 - 使用Actor模式管理并发状态
//
// 用Actor模式替代Arc<Mutex<T>>，通过消息传递实现并发控制
// 两个按键事件生产者与异步补全结果汇入同一个串行消费者

pub mod assistant;

pub use assistant::{AssistantActor, AssistantCommand, AssistantHandle, PendingRequest};
