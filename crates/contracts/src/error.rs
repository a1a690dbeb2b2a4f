//! 错误分层定义
//!
//! 按来源分层：时间戳 / 车辆状态 / 输入校验 / 内部错误 / IO

use thiserror::Error;

/// 错误类别（用于诊断计数与测试断言）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 帧时间戳乱序
    OutOfOrderTimestamp,
    /// 查询时刻无可用车辆状态
    MissingVehicleState,
    /// 输入非法（空帧、配置错误、解析失败）
    InvalidInput,
    /// 内部错误
    InternalError,
}

/// 统一错误类型
#[derive(Debug, Error)]
pub enum PipelineError {
    // ===== 帧排序错误 =====
    /// 严格单调模式下帧时间戳不递增
    #[error("out-of-order timestamp: {message}")]
    OutOfOrderTimestamp { message: String },

    // ===== 状态错误 =====
    /// 自车状态缓冲无法覆盖查询时刻
    #[error("missing vehicle state: {message}")]
    MissingVehicleState { message: String },

    // ===== 输入错误 =====
    /// 输入校验失败
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    // ===== 内部错误 =====
    /// 不应出现的内部状态
    #[error("internal error: {message}")]
    InternalError { message: String },

    // ===== 通用错误 =====
    /// IO 错误
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// 创建乱序时间戳错误
    pub fn out_of_order(message: impl Into<String>) -> Self {
        Self::OutOfOrderTimestamp {
            message: message.into(),
        }
    }

    /// 创建缺失车辆状态错误
    pub fn missing_state(message: impl Into<String>) -> Self {
        Self::MissingVehicleState {
            message: message.into(),
        }
    }

    /// 创建非法输入错误
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// 错误类别（IO 归入 InvalidInput，边界处按输入错误处理）
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfOrderTimestamp { .. } => ErrorKind::OutOfOrderTimestamp,
            Self::MissingVehicleState { .. } => ErrorKind::MissingVehicleState,
            Self::InvalidInput { .. } | Self::Io(_) => ErrorKind::InvalidInput,
            Self::InternalError { .. } => ErrorKind::InternalError,
        }
    }
}

/// 统一 Result 类型别名
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            PipelineError::out_of_order("x").kind(),
            ErrorKind::OutOfOrderTimestamp
        );
        assert_eq!(
            PipelineError::missing_state("x").kind(),
            ErrorKind::MissingVehicleState
        );
        assert_eq!(
            PipelineError::invalid_input("x").kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(PipelineError::internal("x").kind(), ErrorKind::InternalError);
    }

    #[test]
    fn test_error_message_formatting() {
        let err = PipelineError::invalid_input("frame has no signal ways");
        assert_eq!(err.to_string(), "invalid input: frame has no signal ways");
    }
}
