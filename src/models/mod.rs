pub mod solicitacao;
pub mod usuario;
