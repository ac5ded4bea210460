use tower_lsp::jsonrpc::{Error as RpcError, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{info, warn};

use crate::lsp::documents::DocumentStore;
use crate::lsp::position::{position_to_col_row, span_to_location};
use crate::lsp::semantic_tokens;
use crate::schema::analysis;
use crate::schema::builder::{FileSchemaBuilder, SchemaBuilder};
use crate::schema::error::BuildError;
use crate::schema::model::SchemaModel;
use crate::schema::parser::{self, DeclarationKind};
use crate::schema::project::ProjectContext;

pub struct Backend<B: SchemaBuilder> {
    client: Client,
    project: ProjectContext,
    documents: DocumentStore,
    builder: B,
}

impl Backend<FileSchemaBuilder> {
    pub fn new(client: Client) -> Self {
        Self::build(client, FileSchemaBuilder::new())
    }
}

impl<B: SchemaBuilder> Backend<B> {
    /// Build a Backend with a custom schema builder
    pub fn build(client: Client, builder: B) -> Self {
        Self {
            client,
            project: ProjectContext::new(),
            documents: DocumentStore::new(),
            builder,
        }
    }

    pub fn server_capabilities() -> ServerCapabilities {
        ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
            completion_provider: Some(CompletionOptions {
                resolve_provider: Some(true),
                completion_item: Some(CompletionOptionsCompletionItem {
                    label_details_support: Some(true),
                }),
                ..Default::default()
            }),
            references_provider: Some(OneOf::Left(true)),
            definition_provider: Some(OneOf::Left(true)),
            hover_provider: Some(HoverProviderCapability::Simple(true)),
            semantic_tokens_provider: Some(
                SemanticTokensServerCapabilities::SemanticTokensOptions(SemanticTokensOptions {
                    legend: semantic_tokens::legend(),
                    full: Some(SemanticTokensFullOptions::Bool(true)),
                    range: Some(false),
                    ..Default::default()
                }),
            ),
            workspace: Some(WorkspaceServerCapabilities {
                workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                    supported: Some(false),
                    change_notifications: None,
                }),
                file_operations: None,
            }),
            ..Default::default()
        }
    }

    /// One full schema build rooted at `uri`. Every query that needs type
    /// information pays this cost so it always sees the current project
    /// state; nothing is reused across calls.
    async fn build_fresh_schema(&self, uri: &Url) -> std::result::Result<SchemaModel, BuildError> {
        let config = self.project.create_build_config(uri)?;
        self.builder.build(&config).await
    }
}

fn build_error_to_rpc(err: &BuildError) -> RpcError {
    let mut rpc = RpcError::internal_error();
    rpc.message = err.to_string().into();
    rpc
}

fn completion_item_kind(kind: DeclarationKind) -> CompletionItemKind {
    match kind {
        DeclarationKind::Message => CompletionItemKind::STRUCT,
        DeclarationKind::Enum => CompletionItemKind::ENUM,
        DeclarationKind::Service => CompletionItemKind::INTERFACE,
    }
}

#[tower_lsp::async_trait]
impl<B: SchemaBuilder> LanguageServer for Backend<B> {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        self.client
            .log_message(MessageType::INFO, "proto-lsp initializing")
            .await;

        for folder in params.workspace_folders.unwrap_or_default() {
            self.project.add_project_root(&folder.uri);
        }

        Ok(InitializeResult {
            capabilities: Self::server_capabilities(),
            server_info: Some(ServerInfo {
                name: "proto-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "proto-lsp initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("proto-lsp shutting down");
        Ok(())
    }

    // Document content is fetched lazily on the first query, so opening a
    // document has no effect here.
    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        info!("Document opened: {}", params.text_document.uri);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // With FULL sync mode, the last content change carries the whole
        // document text.
        let Some(text) = params.content_changes.into_iter().last().map(|c| c.text) else {
            return;
        };

        let uri = params.text_document.uri;
        let version = params.text_document.version;
        let applied = self.documents.apply_change(&uri, version, text).await;
        info!("Document changed: {} (v{}, applied: {})", uri, version, applied);
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = position_to_col_row(params.text_document_position_params.position);

        let schema = self
            .build_fresh_schema(&uri)
            .await
            .map_err(|e| build_error_to_rpc(&e))?;
        let Ok(path) = uri.to_file_path() else {
            return Ok(None);
        };

        Ok(analysis::goto_definition(&schema, &path, position)
            .as_ref()
            .and_then(span_to_location)
            .map(GotoDefinitionResponse::Scalar))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let uri = params.text_document_position.text_document.uri;
        let position = position_to_col_row(params.text_document_position.position);
        let include_declaration = params.context.include_declaration;

        let schema = self
            .build_fresh_schema(&uri)
            .await
            .map_err(|e| build_error_to_rpc(&e))?;
        let Ok(path) = uri.to_file_path() else {
            return Ok(Some(Vec::new()));
        };

        let locations = analysis::find_all_references(&schema, &path, position, include_declaration)
            .iter()
            .filter_map(span_to_location)
            .collect();
        Ok(Some(locations))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = position_to_col_row(params.text_document_position_params.position);

        // Cheap pre-check: parse only the queried document and bail out
        // before paying for a full cross-file build when the cursor is not
        // on a type reference.
        let Ok(text) = self.documents.get_content(&uri).await else {
            return Ok(None);
        };
        let Ok(tree) = parser::parse(&text) else {
            return Ok(None);
        };
        if tree.type_reference_at(position).is_none() {
            return Ok(None);
        }

        let schema = match self.build_fresh_schema(&uri).await {
            Ok(schema) => schema,
            Err(e) => {
                warn!("Hover build failed for {}: {}", uri, e);
                return Ok(None);
            }
        };
        let Ok(path) = uri.to_file_path() else {
            return Ok(None);
        };

        Ok(analysis::type_information(&schema, &path, position).map(|value| Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value,
            }),
            range: None,
        }))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = position_to_col_row(params.text_document_position.position);

        let schema = match self.build_fresh_schema(&uri).await {
            Ok(schema) => schema,
            Err(e) => {
                // Tell the client suggestions may be missing rather than
                // asserting there are none, so it retries as typing
                // continues.
                warn!("Completion build failed for {}: {}", uri, e);
                return Ok(Some(CompletionResponse::List(CompletionList {
                    is_incomplete: true,
                    items: Vec::new(),
                })));
            }
        };

        let Ok(path) = uri.to_file_path() else {
            return Ok(Some(CompletionResponse::List(CompletionList {
                is_incomplete: false,
                items: Vec::new(),
            })));
        };

        let items = analysis::completion_candidates(&schema, &path, position)
            .into_iter()
            .map(|candidate| CompletionItem {
                label: candidate.name,
                label_details: Some(CompletionItemLabelDetails {
                    detail: None,
                    description: candidate.package.clone(),
                }),
                kind: Some(completion_item_kind(candidate.kind)),
                detail: Some(candidate.full_name),
                ..Default::default()
            })
            .collect();

        Ok(Some(CompletionResponse::List(CompletionList {
            is_incomplete: false,
            items,
        })))
    }

    async fn completion_resolve(&self, item: CompletionItem) -> Result<CompletionItem> {
        Ok(item)
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        let uri = params.text_document.uri;

        let Ok(text) = self.documents.get_content(&uri).await else {
            return Ok(None);
        };
        let Ok(tree) = parser::parse(&text) else {
            return Ok(None);
        };

        let data = semantic_tokens::to_delta_tokens(&semantic_tokens::classify(&tree));
        Ok(Some(SemanticTokensResult::Tokens(SemanticTokens {
            result_id: None,
            data,
        })))
    }
}
