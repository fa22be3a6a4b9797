use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tracing::debug;

use plant_common::api::{ChatReply, ChatRequest, DiseaseListResponse, DiseaseSummary, GetDiseaseParams};
use plant_common::catalog::DiseaseCatalog;
use plant_common::faq::FaqMatcher;
use plant_common::model::DiseaseRecord;

#[derive(Clone)]
pub struct PlantDoctorServer {
    catalog: Arc<DiseaseCatalog>,
    faq: Arc<FaqMatcher>,
    tool_router: ToolRouter<PlantDoctorServer>,
}

impl PlantDoctorServer {
    pub fn new(catalog: Arc<DiseaseCatalog>, faq: Arc<FaqMatcher>) -> Self {
        Self {
            catalog,
            faq,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl PlantDoctorServer {
    #[tool(description = "Answer a plant-care question from the FAQ. The first FAQ question contained in the message (case-insensitive) wins; otherwise a fallback reply is returned.")]
    async fn ask_faq(
        &self,
        Parameters(params): Parameters<ChatRequest>,
    ) -> Result<Json<ChatReply>, String> {
        let message = params.message.unwrap_or_default();
        let reply = self.faq.reply(&message).to_string();
        Ok(Json(ChatReply { reply }))
    }

    #[tool(description = "Get disease information (description, treatment steps, pesticide guidance, severity) by exact classifier label, e.g. 'Tomato_Late_blight'.")]
    async fn get_disease(
        &self,
        Parameters(params): Parameters<GetDiseaseParams>,
    ) -> Result<Json<DiseaseRecord>, String> {
        let record = self.catalog.lookup(&params.class_id).map_err(|e| {
            debug!(class_id = %params.class_id, "catalog miss");
            e.to_string()
        })?;
        Ok(Json(record.clone()))
    }

    #[tool(description = "List every known classifier label with its name, severity and whether it denotes a healthy plant.")]
    async fn list_diseases(&self) -> Result<Json<DiseaseListResponse>, String> {
        let diseases = self
            .catalog
            .list()
            .iter()
            .map(|r| DiseaseSummary::from_record(r, self.catalog.is_healthy(&r.class_id)))
            .collect();
        Ok(Json(DiseaseListResponse { diseases }))
    }
}

#[tool_handler]
impl ServerHandler for PlantDoctorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "plant-doctor".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Plant disease knowledge MCP server. Use ask_faq for general plant-care questions, \
                 list_diseases to discover classifier labels, and get_disease for the treatment \
                 record of a specific label."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tools_publish_output_schemas() {
        let tools = PlantDoctorServer::tool_router().list_all();
        for name in ["ask_faq", "get_disease", "list_diseases"] {
            let tool = tools
                .iter()
                .find(|t| t.name == name)
                .unwrap_or_else(|| panic!("missing tool: {name}"));
            assert!(
                tool.output_schema.is_some(),
                "tool {name} should publish output_schema"
            );
        }
    }

    #[tokio::test]
    async fn tools_answer_from_shared_data() {
        let server = PlantDoctorServer::new(
            Arc::new(DiseaseCatalog::builtin().unwrap()),
            Arc::new(FaqMatcher::builtin().unwrap()),
        );

        let Json(reply) = server
            .ask_faq(Parameters(ChatRequest {
                message: Some("Does overwatering cause diseases?".to_string()),
            }))
            .await
            .unwrap();
        assert_eq!(reply.reply, "Yes, overwatering leads to root rot and fungal infections.");

        let Json(record) = server
            .get_disease(Parameters(GetDiseaseParams {
                class_id: "Squash_Powdery_mildew".to_string(),
            }))
            .await
            .unwrap();
        assert_eq!(record.class_id, "Squash_Powdery_mildew");

        let miss = server
            .get_disease(Parameters(GetDiseaseParams {
                class_id: "__unknown__".to_string(),
            }))
            .await;
        match miss {
            Err(err) => assert_eq!(err, "disease class not found: __unknown__"),
            Ok(_) => panic!("unknown class id should be a tool error"),
        }

        let Json(list) = server.list_diseases().await.unwrap();
        assert_eq!(list.diseases.len(), 38);
    }
}
