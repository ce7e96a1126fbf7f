// src/models/solicitacao.rs
use chrono::NaiveDateTime;
use serde::Deserialize;
use sqlx::FromRow;

/// Conjunto fechado de status de uma solicitação. A gestão pode sobrescrever
/// para qualquer valor do conjunto (não há tabela de transições), mas valores
/// fora do conjunto são rejeitados na entrada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Pendente,
    EmAnalise,
    Aprovado,
    Negado,
}

impl Status {
    pub fn parse(valor: &str) -> Option<Status> {
        match valor {
            "PENDENTE" => Some(Status::Pendente),
            "EM ANÁLISE" => Some(Status::EmAnalise),
            "APROVADO" => Some(Status::Aprovado),
            "NEGADO" => Some(Status::Negado),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pendente => "PENDENTE",
            Status::EmAnalise => "EM ANÁLISE",
            Status::Aprovado => "APROVADO",
            Status::Negado => "NEGADO",
        }
    }

    /// Cor do evento na agenda (verde/vermelho/amarelo/azul).
    pub fn cor_agenda(&self) -> &'static str {
        match self {
            Status::Aprovado => "#28a745",
            Status::Negado => "#dc3545",
            Status::EmAnalise => "#ffc107",
            Status::Pendente => "#0d6efd",
        }
    }

    pub const TODOS: &'static [Status] = &[
        Status::Pendente,
        Status::EmAnalise,
        Status::Aprovado,
        Status::Negado,
    ];
}

// Espelha a tabela 'solicitacoes'
#[derive(Debug, Clone, FromRow)]
pub struct Solicitacao {
    pub id: i64,

    pub data_agendamento: String,
    pub hora_agendamento: String,

    pub cep: String,
    pub logradouro: String,
    pub numero: String,
    pub bairro: String,
    pub cidade: String,
    pub uf: String,
    pub complemento: String,

    pub foco: String,
    pub tipo_visita: String,
    pub altura_voo: String,
    pub criadouro: String,
    pub apoio_cet: String,
    pub observacoes: String,

    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub protocolo: Option<String>,
    pub justificativa: Option<String>,

    pub status: String,
    pub data_criacao: NaiveDateTime,

    pub usuario_id: i64,
}

impl Solicitacao {
    pub fn latitude_texto(&self) -> &str {
        self.latitude.as_deref().unwrap_or("")
    }
    pub fn longitude_texto(&self) -> &str {
        self.longitude.as_deref().unwrap_or("")
    }
    pub fn protocolo_texto(&self) -> &str {
        self.protocolo.as_deref().unwrap_or("")
    }
    pub fn justificativa_texto(&self) -> &str {
        self.justificativa.as_deref().unwrap_or("")
    }

    pub fn tem_status(&self, valor: &str) -> bool {
        self.status == valor
    }

    /// Cor do selo de status nas listagens (mesma paleta da agenda).
    pub fn cor_status(&self) -> &'static str {
        Status::parse(&self.status)
            .map(|s| s.cor_agenda())
            .unwrap_or("#6c757d")
    }

    /// Data de criação no formato de exibição brasileiro.
    pub fn criado_em_texto(&self) -> String {
        self.data_criacao.format("%d/%m/%Y %H:%M").to_string()
    }

    /// Endereço em linha única, no formato usado nas exportações.
    pub fn endereco_completo(&self) -> String {
        let mut partes = format!("{}, {}", self.logradouro, self.numero);
        if !self.bairro.is_empty() {
            partes.push_str(&format!(" - {}", self.bairro));
        }
        if !self.cidade.is_empty() {
            partes.push_str(&format!(", {}", self.cidade));
        }
        partes.trim_matches([' ', ',', '-']).to_string()
    }
}

/// Linha da listagem de gestão: solicitação + dados da unidade autora.
#[derive(Debug, Clone, FromRow)]
pub struct SolicitacaoComAutor {
    #[sqlx(flatten)]
    pub solicitacao: Solicitacao,
    pub nome_uvis: String,
    pub regiao: String,
}

// --- Formulários ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NovaSolicitacaoForm {
    pub data: String,
    pub hora: String,

    pub cep: String,
    pub logradouro: String,
    #[serde(default)]
    pub numero: String,
    pub bairro: String,
    pub cidade: String,
    pub uf: String,
    #[serde(default)]
    pub complemento: String,

    pub foco: String,
    #[serde(default)]
    pub tipo_visita: String,
    #[serde(default)]
    pub altura_voo: String,
    #[serde(default)]
    pub criadouro: String,
    #[serde(default)]
    pub apoio_cet: String,
    #[serde(default)]
    pub observacoes: String,
}

/// Atualização rápida feita pela gestão direto na listagem.
#[derive(Debug, Deserialize)]
pub struct AtualizacaoForm {
    pub status: String,
    #[serde(default)]
    pub protocolo: String,
    #[serde(default)]
    pub justificativa: String,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
}

/// Edição completa (somente admin): todos os campos do registo.
#[derive(Debug, Deserialize)]
pub struct EdicaoCompletaForm {
    pub data: String,
    pub hora: String,

    pub cep: String,
    pub logradouro: String,
    #[serde(default)]
    pub numero: String,
    pub bairro: String,
    pub cidade: String,
    pub uf: String,
    #[serde(default)]
    pub complemento: String,

    pub foco: String,
    #[serde(default)]
    pub tipo_visita: String,
    #[serde(default)]
    pub altura_voo: String,
    #[serde(default)]
    pub criadouro: String,
    #[serde(default)]
    pub apoio_cet: String,
    #[serde(default)]
    pub observacoes: String,

    pub status: String,
    #[serde(default)]
    pub protocolo: String,
    #[serde(default)]
    pub justificativa: String,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
}

/// Filtros da listagem de gestão (query string).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FiltrosAdmin {
    pub status: Option<String>,
    pub unidade: Option<String>,
    pub regiao: Option<String>,
    pub page: Option<i64>,
}

/// Página de resultados; páginas fora do intervalo voltam vazias, nunca erro.
#[derive(Debug, Clone)]
pub struct Pagina<T> {
    pub itens: Vec<T>,
    pub pagina: i64,
    pub total_itens: i64,
    pub total_paginas: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_rejeita_valores_fora_do_conjunto() {
        assert_eq!(Status::parse("APROVADO"), Some(Status::Aprovado));
        assert_eq!(Status::parse("EM ANÁLISE"), Some(Status::EmAnalise));
        assert_eq!(Status::parse("aprovado"), None);
        assert_eq!(Status::parse("CANCELADO"), None);
    }

    #[test]
    fn cores_da_agenda_por_status() {
        assert_eq!(Status::Aprovado.cor_agenda(), "#28a745");
        assert_eq!(Status::Negado.cor_agenda(), "#dc3545");
        assert_eq!(Status::EmAnalise.cor_agenda(), "#ffc107");
        assert_eq!(Status::Pendente.cor_agenda(), "#0d6efd");
    }
}
