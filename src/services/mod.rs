/*
 * Responsibility
 * - 外部サービスとの境界 (auth provider)
 */
pub mod auth;
