//! 领域模型
//!
//! 包含账户、捐赠、徽章等核心实体定义

pub mod account;
pub mod badge;
pub mod donation;
pub mod enums;

// 重新导出常用类型
pub use account::{Account, NewAccount};
pub use badge::{AccountBadge, Badge, DonorProgress, OwnedBadge, select_conquest_grants};
pub use donation::{Donation, DonationDetail, DonationType, NewDonation};
pub use enums::{AwardSource, BadgeKind, DonationStatus, Role};
