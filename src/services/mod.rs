pub mod agenda_service;
pub mod auth_service;
pub mod excel_service;
pub mod pdf_service;
pub mod relatorio_service;
pub mod solicitacao_service;
pub mod usuario_service;
