//! The dashboard: named datasources, positioned panes, and the event loop
//! tying them together.
//!
//! All state mutation happens on the task driving [`Dashboard::run`] (or
//! calling the processing methods directly). Datasource payloads and
//! widget actions arrive over channels with a single consumer, so updates
//! from one datasource are applied in arrival order and a disposed
//! instance can never mutate anything afterwards.

mod error;
mod serialize;


pub use error::DashboardError;
pub use serialize::{
    DashboardDocument, DatasourceDocument, PaneDocument, WidgetDocument, SERIALIZATION_VERSION,
};

use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::datasource::{DatasourceEvent, DatasourceModel};
use crate::layout::{GridLayout, LayoutService, PanePlacement};
use crate::pane::PaneModel;
use crate::plugin::{PluginLoader, PluginRegistry, SettingsMap};
use crate::widget::{EventSink, WidgetEvent, WidgetModel};

/// Receiver half of the dashboard's channels; feed it to [`Dashboard::run`].
pub struct DashboardEvents {
    datasources: mpsc::UnboundedReceiver<DatasourceEvent>,
    widgets: mpsc::UnboundedReceiver<WidgetEvent>,
}

impl DashboardEvents {
    /// Wait for the next datasource event. Hosts pumping the dashboard
    /// manually (instead of [`Dashboard::run`]) read from here and feed
    /// [`Dashboard::process_datasource_event`].
    pub async fn next_datasource_event(&mut self) -> Option<DatasourceEvent> {
        self.datasources.recv().await
    }

    pub fn try_next_datasource_event(&mut self) -> Option<DatasourceEvent> {
        self.datasources.try_recv().ok()
    }

    /// Wait for the next widget action.
    pub async fn next_widget_event(&mut self) -> Option<WidgetEvent> {
        self.widgets.recv().await
    }

    pub fn try_next_widget_event(&mut self) -> Option<WidgetEvent> {
        self.widgets.try_recv().ok()
    }
}

pub struct Dashboard {
    header_image: Option<String>,
    allow_edit: bool,
    is_editing: bool,
    plugin_sources: Vec<String>,
    datasources: Vec<DatasourceModel>,
    panes: Vec<(u64, PaneModel)>,
    next_pane_id: u64,
    /// Latest payload per datasource name; the evaluation context for
    /// every calculated setting.
    datasource_data: Map<String, Value>,
    registry: PluginRegistry,
    layout: Box<dyn LayoutService>,
    ds_tx: mpsc::UnboundedSender<DatasourceEvent>,
    widget_tx: mpsc::UnboundedSender<WidgetEvent>,
}

impl Dashboard {
    pub fn new(registry: PluginRegistry) -> (Self, DashboardEvents) {
        Self::with_layout(registry, Box::new(GridLayout::default()))
    }

    pub fn with_layout(
        registry: PluginRegistry,
        layout: Box<dyn LayoutService>,
    ) -> (Self, DashboardEvents) {
        let (ds_tx, ds_rx) = mpsc::unbounded_channel();
        let (widget_tx, widget_rx) = mpsc::unbounded_channel();
        (
            Self {
                header_image: None,
                allow_edit: true,
                is_editing: false,
                plugin_sources: Vec::new(),
                datasources: Vec::new(),
                panes: Vec::new(),
                next_pane_id: 1,
                datasource_data: Map::new(),
                registry,
                layout,
                ds_tx,
                widget_tx,
            },
            DashboardEvents {
                datasources: ds_rx,
                widgets: widget_rx,
            },
        )
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn header_image(&self) -> Option<&str> {
        self.header_image.as_deref()
    }

    pub fn set_header_image(&mut self, url: Option<String>) {
        self.header_image = url;
    }

    pub fn allow_edit(&self) -> bool {
        self.allow_edit
    }

    pub fn set_allow_edit(&mut self, allow: bool) {
        self.allow_edit = allow;
        if !allow {
            self.is_editing = false;
        }
    }

    pub fn is_editing(&self) -> bool {
        self.is_editing
    }

    /// Enter or leave edit mode. Entering is refused when editing is
    /// disallowed by the loaded document.
    pub fn set_editing(&mut self, editing: bool) {
        if editing && !self.allow_edit {
            return;
        }
        self.is_editing = editing;
    }

    pub fn columns(&self) -> u32 {
        self.layout.columns()
    }

    /// Change the grid column count and move every pane to its recorded
    /// position for the new count.
    pub fn set_columns(&mut self, columns: u32) {
        self.layout.set_columns(columns);
        let columns = self.layout.columns();
        for (id, pane) in &self.panes {
            let (row, col) = pane.position_for_columns(columns);
            self.layout.reposition(
                *id,
                PanePlacement {
                    row,
                    col,
                    col_width: pane.col_width(),
                    height: pane.calculated_height(),
                },
            );
        }
    }

    /// Latest payload per datasource name.
    pub fn datasource_data(&self) -> &Map<String, Value> {
        &self.datasource_data
    }

    // ---- datasources ----

    pub fn datasources(&self) -> &[DatasourceModel] {
        &self.datasources
    }

    pub fn datasource(&self, name: &str) -> Option<&DatasourceModel> {
        self.datasources.iter().find(|ds| ds.name() == name)
    }

    /// Create a datasource and start its instance.
    pub async fn add_datasource(
        &mut self,
        name: &str,
        type_name: &str,
        settings: SettingsMap,
    ) -> Result<(), DashboardError> {
        if self.datasource(name).is_some() {
            return Err(DashboardError::DuplicateDatasource(name.to_string()));
        }
        let mut model = DatasourceModel::new(name, self.ds_tx.clone());
        model.set_type(&self.registry, type_name, settings).await?;
        self.datasources.push(model);
        Ok(())
    }

    /// Forward new settings to a running datasource.
    pub async fn update_datasource_settings(
        &mut self,
        name: &str,
        settings: SettingsMap,
    ) -> Result<(), DashboardError> {
        let model = self
            .datasources
            .iter_mut()
            .find(|ds| ds.name() == name)
            .ok_or_else(|| DashboardError::UnknownDatasource(name.to_string()))?;
        model.set_settings(settings).await;
        Ok(())
    }

    /// Dispose a datasource and drop its cached payload.
    pub fn delete_datasource(&mut self, name: &str) -> Result<(), DashboardError> {
        let index = self
            .datasources
            .iter()
            .position(|ds| ds.name() == name)
            .ok_or_else(|| DashboardError::UnknownDatasource(name.to_string()))?;
        let mut model = self.datasources.remove(index);
        model.dispose();
        self.datasource_data.remove(name);
        Ok(())
    }

    /// Trigger an immediate update on every datasource.
    pub async fn update_all_datasources(&mut self) {
        for model in &mut self.datasources {
            model.update_now().await;
        }
    }

    /// Push a value upstream through the named datasource.
    pub async fn write_to_datasource(
        &mut self,
        name: &str,
        value: Value,
    ) -> Result<(), DashboardError> {
        let model = self
            .datasources
            .iter_mut()
            .find(|ds| ds.name() == name)
            .ok_or_else(|| DashboardError::UnknownDatasource(name.to_string()))?;
        model.write_now(value).await?;
        Ok(())
    }

    // ---- panes and widgets ----

    pub fn panes(&self) -> impl Iterator<Item = &PaneModel> {
        self.panes.iter().map(|(_, pane)| pane)
    }

    pub fn panes_mut(&mut self) -> impl Iterator<Item = &mut PaneModel> {
        self.panes.iter_mut().map(|(_, pane)| pane)
    }

    pub fn pane_count(&self) -> usize {
        self.panes.len()
    }

    /// A widget model wired to this dashboard's event channel, ready for
    /// `set_type` and placement on a pane.
    pub fn new_widget(&self) -> WidgetModel {
        WidgetModel::new(EventSink::new(self.widget_tx.clone()))
    }

    /// Place a pane on the grid. Returns its layout id.
    pub fn add_pane(&mut self, pane: PaneModel) -> u64 {
        let id = self.next_pane_id;
        self.next_pane_id += 1;

        let (row, col) = pane.position_for_columns(self.layout.columns());
        self.layout.add_pane(
            id,
            PanePlacement {
                row,
                col,
                col_width: pane.col_width(),
                height: pane.calculated_height(),
            },
        );
        self.panes.push((id, pane));
        id
    }

    /// Remove a pane, disposing every widget in it.
    pub fn delete_pane(&mut self, pane_id: u64) {
        if let Some(index) = self.panes.iter().position(|(id, _)| *id == pane_id) {
            let (_, mut pane) = self.panes.remove(index);
            pane.dispose();
            self.layout.remove_pane(pane_id);
        }
    }

    // ---- event processing ----

    /// Apply one datasource event: cache the payload, stamp the model's
    /// bookkeeping, and fan the update out to every widget.
    pub fn process_datasource_event(&mut self, event: DatasourceEvent) {
        match event {
            DatasourceEvent::Update { name, payload } => {
                self.datasource_data.insert(name.clone(), payload);
                if let Some(model) = self.datasources.iter_mut().find(|ds| ds.name() == name) {
                    model.record_update();
                }
                for (_, pane) in &mut self.panes {
                    pane.process_datasource_update(&name, &self.datasource_data);
                }
            }
            DatasourceEvent::Error { name, message } => {
                tracing::warn!(datasource = %name, %message, "datasource error");
                if let Some(model) = self.datasources.iter_mut().find(|ds| ds.name() == name) {
                    model.record_error(message);
                }
            }
        }
    }

    /// Apply one widget action.
    pub async fn process_widget_event(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::Write {
                datasource_name,
                value,
            } => {
                if let Err(error) = self.write_to_datasource(&datasource_name, value).await {
                    tracing::warn!(datasource = %datasource_name, %error, "write-back failed");
                }
            }
        }
    }

    /// Drive the dashboard until cancelled. Single consumer: events from
    /// any one datasource are applied in the order they were sent.
    pub async fn run(&mut self, mut events: DashboardEvents, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = events.datasources.recv() => match event {
                    Some(event) => self.process_datasource_event(event),
                    None => break,
                },
                event = events.widgets.recv() => match event {
                    Some(event) => self.process_widget_event(event).await,
                    None => break,
                },
            }
        }
        tracing::debug!("dashboard event loop stopped");
    }

    // ---- load and save ----

    /// Dispose everything and return to the pristine empty state.
    pub fn clear(&mut self) {
        for (_, pane) in &mut self.panes {
            pane.dispose();
        }
        self.panes.clear();
        self.layout.remove_all();
        for model in &mut self.datasources {
            model.dispose();
        }
        self.datasources.clear();
        self.datasource_data.clear();
        self.plugin_sources.clear();
        self.header_image = None;
        self.allow_edit = true;
        self.is_editing = false;
    }

    /// Snapshot the dashboard as a versioned document.
    pub fn serialize(&self) -> DashboardDocument {
        DashboardDocument {
            version: SERIALIZATION_VERSION,
            header_image: self.header_image.clone(),
            allow_edit: self.allow_edit,
            plugins: self.plugin_sources.clone(),
            datasources: self
                .datasources
                .iter()
                .map(|ds| DatasourceDocument {
                    name: ds.name().to_string(),
                    type_name: ds.type_name().to_string(),
                    settings: ds.settings().clone(),
                })
                .collect(),
            panes: self
                .panes
                .iter()
                .map(|(_, pane)| PaneDocument {
                    title: pane.title().to_string(),
                    width: pane.width(),
                    row: pane.row().clone(),
                    col: pane.col().clone(),
                    col_width: pane.col_width(),
                    widgets: pane
                        .widgets()
                        .iter()
                        .map(|widget| WidgetDocument {
                            title: widget.title().to_string(),
                            type_name: widget.type_name().to_string(),
                            settings: widget.settings().clone(),
                        })
                        .collect(),
                })
                .collect(),
            columns: Some(self.layout.columns()),
        }
    }

    /// Replace the dashboard's contents with a saved document.
    ///
    /// The current contents are cleared first. External plugin sources are
    /// resolved through the loader before any instance is constructed.
    /// Entries with unknown types are skipped with a warning rather than
    /// failing the whole load.
    pub async fn deserialize(
        &mut self,
        document: DashboardDocument,
        loader: &dyn PluginLoader,
    ) -> Result<(), DashboardError> {
        if document.version > SERIALIZATION_VERSION {
            return Err(DashboardError::UnsupportedVersion(document.version));
        }

        self.clear();

        loader.load(&document.plugins, &mut self.registry).await?;
        self.plugin_sources = document.plugins;

        if let Some(columns) = document.columns {
            self.layout.set_columns(columns);
        }
        self.header_image = document.header_image;
        self.allow_edit = document.allow_edit;

        for ds in document.datasources {
            if let Err(error) = self.add_datasource(&ds.name, &ds.type_name, ds.settings).await {
                tracing::warn!(datasource = %ds.name, %error, "skipping datasource");
            }
        }

        // Panes load in top-to-bottom order for the document's column count
        let columns = self.layout.columns();
        let mut pane_docs = document.panes;
        pane_docs.sort_by_key(|doc| doc.row.for_columns(columns));

        for doc in pane_docs {
            let mut pane = PaneModel::new();
            pane.set_title(doc.title);
            pane.set_width(doc.width);
            pane.set_col_width(doc.col_width);
            pane.set_row(doc.row);
            pane.set_col(doc.col);

            for widget_doc in doc.widgets {
                let mut settings = widget_doc.settings;
                serialize::rewrite_legacy_refs(&mut settings);

                let mut widget = self.new_widget();
                widget.set_title(widget_doc.title);
                match widget.set_type(
                    &self.registry,
                    &widget_doc.type_name,
                    settings,
                    &self.datasource_data,
                ) {
                    Ok(()) => pane.add_widget(widget),
                    Err(error) => {
                        tracing::warn!(widget = %widget_doc.type_name, %error, "skipping widget");
                    }
                }
            }

            self.add_pane(pane);
        }

        Ok(())
    }
}
