// src/services/agenda_service.rs
use crate::{
    error::AppResult,
    models::{
        solicitacao::Status,
        usuario::{Papel, UsuarioSessao},
    },
};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

/// Evento no formato consumido pelo calendário (FullCalendar).
#[derive(Debug, Clone, Serialize)]
pub struct EventoAgenda {
    pub id: i64,
    pub title: String,
    pub start: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub color: &'static str,
}

#[derive(Debug, FromRow)]
struct LinhaAgenda {
    id: i64,
    data_agendamento: String,
    hora_agendamento: String,
    foco: String,
    status: String,
    nome_uvis: String,
}

/// Eventos da agenda: gestão vê todas as solicitações agendadas, a unidade
/// de campo vê apenas as suas. Registos sem data ficam de fora.
pub async fn eventos(pool: &SqlitePool, sessao: &UsuarioSessao) -> AppResult<Vec<EventoAgenda>> {
    let base = "SELECT s.id, s.data_agendamento, s.hora_agendamento, s.foco, s.status, u.nome_uvis \
                FROM solicitacoes s JOIN usuarios u ON u.id = s.usuario_id \
                WHERE s.data_agendamento <> ''";

    let linhas: Vec<LinhaAgenda> = if sessao.papel.e_gestao() {
        sqlx::query_as(&format!("{base} ORDER BY s.data_agendamento ASC"))
            .fetch_all(pool)
            .await?
    } else {
        sqlx::query_as(&format!(
            "{base} AND s.usuario_id = ?1 ORDER BY s.data_agendamento ASC"
        ))
        .bind(sessao.id)
        .fetch_all(pool)
        .await?
    };

    let eventos = linhas
        .into_iter()
        .map(|linha| {
            let hora = if linha.hora_agendamento.is_empty() {
                "00:00"
            } else {
                &linha.hora_agendamento
            };
            let cor = Status::parse(&linha.status)
                .map(|s| s.cor_agenda())
                .unwrap_or(Status::Pendente.cor_agenda());
            let url = match sessao.papel {
                Papel::Admin => Some(format!("/admin/editar_completo/{}", linha.id)),
                Papel::Operario => Some("/admin".to_string()),
                _ => None,
            };
            EventoAgenda {
                id: linha.id,
                title: format!("{} - {}", linha.foco, linha.nome_uvis),
                start: format!("{}T{}:00", linha.data_agendamento, hora),
                url,
                color: cor,
            }
        })
        .collect();

    Ok(eventos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::solicitacao::{AtualizacaoForm, NovaSolicitacaoForm};
    use crate::services::{solicitacao_service, usuario_service};

    fn sessao(id: i64, papel: Papel) -> UsuarioSessao {
        UsuarioSessao {
            id,
            nome: "x".to_string(),
            papel,
        }
    }

    #[tokio::test]
    async fn gestao_ve_tudo_uvis_ve_apenas_o_seu() {
        let pool = db::pool_em_memoria().await;
        db::semear_usuarios(&pool).await.unwrap();
        let lapa = usuario_service::buscar_por_login(&pool, "lapa")
            .await
            .unwrap()
            .unwrap()
            .id;
        let teste = usuario_service::buscar_por_login(&pool, "teste")
            .await
            .unwrap()
            .unwrap()
            .id;

        let form = NovaSolicitacaoForm {
            data: "2026-03-15".to_string(),
            hora: "09:30".to_string(),
            cep: "05077-000".to_string(),
            logradouro: "Rua B".to_string(),
            bairro: "Centro".to_string(),
            cidade: "São Paulo".to_string(),
            uf: "SP".to_string(),
            foco: "Aedes".to_string(),
            ..Default::default()
        };
        let id_lapa = solicitacao_service::criar(&pool, lapa, &form).await.unwrap();
        solicitacao_service::criar(&pool, teste, &form).await.unwrap();

        solicitacao_service::atualizar(
            &pool,
            id_lapa,
            &AtualizacaoForm {
                status: "APROVADO".to_string(),
                protocolo: String::new(),
                justificativa: String::new(),
                latitude: String::new(),
                longitude: String::new(),
            },
        )
        .await
        .unwrap();

        let admin = eventos(&pool, &sessao(1, Papel::Admin)).await.unwrap();
        assert_eq!(admin.len(), 2);
        let aprovado = admin.iter().find(|e| e.id == id_lapa).unwrap();
        assert_eq!(aprovado.color, "#28a745");
        assert_eq!(aprovado.start, "2026-03-15T09:30:00");
        assert_eq!(
            aprovado.url.as_deref(),
            Some(format!("/admin/editar_completo/{}", id_lapa).as_str())
        );
        assert!(aprovado.title.contains("Aedes"));
        assert!(aprovado.title.contains("UVIS Lapa/Pinheiros"));

        let so_lapa = eventos(&pool, &sessao(lapa, Papel::Uvis)).await.unwrap();
        assert_eq!(so_lapa.len(), 1);
        assert!(so_lapa[0].url.is_none());

        let visual = eventos(&pool, &sessao(1, Papel::Visualizar)).await.unwrap();
        assert_eq!(visual.len(), 2);
        assert!(visual.iter().all(|e| e.url.is_none()));
    }
}
