/// Vulkan implementation of the pipeline cache `Device` trait
///
/// Translates the cache's creation descriptors into ash calls. The caller
/// keeps ownership of the `ash::Device` and of the allocator; `VulkanDevice`
/// only owns the memory of the dummy resources it creates.

use std::ffi::CStr;
use std::sync::{Arc, Mutex};

use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme, Allocator};
use gpu_allocator::MemoryLocation;
use rustc_hash::FxHashMap;

use galaxy_3d_pipeline_cache::galaxy3d::device::{
    BufferHandle, CommandBufferHandle, DescriptorBundle, DescriptorPoolDesc, DescriptorPoolHandle,
    DescriptorResource, DescriptorSetHandle, DescriptorSetLayoutBinding, DescriptorSetLayoutHandle,
    DescriptorSetLayouts, DescriptorWrite, DummyResources, GpuObject, GraphicsPipelineDesc,
    ImageHandle, ImageViewHandle, PipelineHandle, PipelineLayoutHandle, Rect2D, SamplerHandle,
};
use galaxy_3d_pipeline_cache::galaxy3d::key::DESCRIPTOR_TYPE_COUNT;
use galaxy_3d_pipeline_cache::galaxy3d::{Device, Error, Result};
use galaxy_3d_pipeline_cache::{engine_debug, engine_err, engine_error, engine_warn};

use crate::vulkan_convert::*;

/// Entry point of every shader module handed to the cache
const SHADER_ENTRY_POINT: &CStr = c"main";

/// Size of the dummy uniform buffer
const DUMMY_BUFFER_SIZE: u64 = 16;

/// Format of the 1x1 dummy image
const DUMMY_IMAGE_FORMAT: vk::Format = vk::Format::R8G8B8A8_UNORM;

/// Vulkan backend for `PipelineCacheEngine`
pub struct VulkanDevice {
    device: ash::Device,
    allocator: Arc<Mutex<Allocator>>,
    /// Memory of the dummy buffer and image, keyed by raw handle
    dummy_allocations: FxHashMap<u64, Allocation>,
}

impl VulkanDevice {
    /// Wrap a logical device and the allocator that serves it
    pub fn new(device: ash::Device, allocator: Arc<Mutex<Allocator>>) -> Self {
        Self {
            device,
            allocator,
            dummy_allocations: FxHashMap::default(),
        }
    }

    /// The wrapped logical device
    pub fn device(&self) -> &ash::Device {
        &self.device
    }

    /// Allocate GPU-only memory for a dummy resource
    fn allocate_dummy_memory(&self, name: &str, requirements: vk::MemoryRequirements, linear: bool) -> Result<Allocation> {
        let mut allocator = self.allocator.lock()
            .map_err(|_| engine_err!("galaxy3d::vulkan", "Allocator mutex poisoned while allocating {}", name))?;

        allocator.allocate(&AllocationCreateDesc {
            name,
            requirements,
            location: MemoryLocation::GpuOnly,
            linear,
            allocation_scheme: AllocationScheme::GpuAllocatorManaged,
        })
        .map_err(|e| {
            engine_error!("galaxy3d::vulkan", "Out of GPU memory for {} ({} bytes): {}", name, requirements.size, e);
            Error::OutOfMemory
        })
    }

    fn create_dummy_buffer(&mut self) -> Result<vk::Buffer> {
        unsafe {
            let buffer_create_info = vk::BufferCreateInfo::default()
                .size(DUMMY_BUFFER_SIZE)
                .usage(vk::BufferUsageFlags::UNIFORM_BUFFER)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = self.device.create_buffer(&buffer_create_info, None)
                .map_err(|e| vk_result_to_error("Failed to create dummy buffer", e))?;

            let requirements = self.device.get_buffer_memory_requirements(buffer);
            let allocation = match self.allocate_dummy_memory("dummy buffer", requirements, true) {
                Ok(allocation) => allocation,
                Err(e) => {
                    self.device.destroy_buffer(buffer, None);
                    return Err(e);
                }
            };

            let bound = self.device.bind_buffer_memory(buffer, allocation.memory(), allocation.offset());
            self.dummy_allocations.insert(vk_to_raw(buffer), allocation);
            bound.map_err(|e| {
                self.release_dummy_buffer(buffer);
                vk_result_to_error("Failed to bind dummy buffer memory", e)
            })?;

            Ok(buffer)
        }
    }

    fn create_dummy_image(&mut self) -> Result<vk::Image> {
        unsafe {
            let image_create_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .format(DUMMY_IMAGE_FORMAT)
                .extent(vk::Extent3D { width: 1, height: 1, depth: 1 })
                .mip_levels(1)
                .array_layers(1)
                .samples(vk::SampleCountFlags::TYPE_1)
                .tiling(vk::ImageTiling::OPTIMAL)
                .usage(vk::ImageUsageFlags::SAMPLED | vk::ImageUsageFlags::INPUT_ATTACHMENT)
                .sharing_mode(vk::SharingMode::EXCLUSIVE)
                .initial_layout(vk::ImageLayout::UNDEFINED);

            let image = self.device.create_image(&image_create_info, None)
                .map_err(|e| vk_result_to_error("Failed to create dummy image", e))?;

            let requirements = self.device.get_image_memory_requirements(image);
            let allocation = match self.allocate_dummy_memory("dummy image", requirements, false) {
                Ok(allocation) => allocation,
                Err(e) => {
                    self.device.destroy_image(image, None);
                    return Err(e);
                }
            };

            let bound = self.device.bind_image_memory(image, allocation.memory(), allocation.offset());
            self.dummy_allocations.insert(vk_to_raw(image), allocation);
            bound.map_err(|e| {
                self.release_dummy_image(image);
                vk_result_to_error("Failed to bind dummy image memory", e)
            })?;

            Ok(image)
        }
    }

    fn create_dummy_image_view(&self, image: vk::Image) -> Result<vk::ImageView> {
        let view_create_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(DUMMY_IMAGE_FORMAT)
            .components(vk::ComponentMapping {
                r: vk::ComponentSwizzle::IDENTITY,
                g: vk::ComponentSwizzle::IDENTITY,
                b: vk::ComponentSwizzle::IDENTITY,
                a: vk::ComponentSwizzle::IDENTITY,
            })
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });

        unsafe {
            self.device.create_image_view(&view_create_info, None)
                .map_err(|e| vk_result_to_error("Failed to create dummy image view", e))
        }
    }

    fn create_dummy_sampler(&self) -> Result<vk::Sampler> {
        let sampler_create_info = vk::SamplerCreateInfo::default()
            .mag_filter(vk::Filter::NEAREST)
            .min_filter(vk::Filter::NEAREST)
            .mipmap_mode(vk::SamplerMipmapMode::NEAREST)
            .address_mode_u(vk::SamplerAddressMode::CLAMP_TO_EDGE)
            .address_mode_v(vk::SamplerAddressMode::CLAMP_TO_EDGE)
            .address_mode_w(vk::SamplerAddressMode::CLAMP_TO_EDGE)
            .min_lod(0.0)
            .max_lod(0.0);

        unsafe {
            self.device.create_sampler(&sampler_create_info, None)
                .map_err(|e| vk_result_to_error("Failed to create dummy sampler", e))
        }
    }

    /// Create each dummy object in turn, recording handles as they succeed
    fn fill_dummy_resources(&mut self, dummy: &mut DummyResources) -> Result<()> {
        dummy.buffer = BufferHandle::from_raw(vk_to_raw(self.create_dummy_buffer()?));
        let image = self.create_dummy_image()?;
        dummy.image = ImageHandle::from_raw(vk_to_raw(image));
        dummy.image_view = ImageViewHandle::from_raw(vk_to_raw(self.create_dummy_image_view(image)?));
        dummy.sampler = SamplerHandle::from_raw(vk_to_raw(self.create_dummy_sampler()?));
        Ok(())
    }

    /// Destroy the dummy buffer and free its memory
    fn release_dummy_buffer(&mut self, buffer: vk::Buffer) {
        unsafe { self.device.destroy_buffer(buffer, None); }
        self.free_dummy_allocation(vk_to_raw(buffer));
    }

    /// Destroy the dummy image and free its memory
    fn release_dummy_image(&mut self, image: vk::Image) {
        unsafe { self.device.destroy_image(image, None); }
        self.free_dummy_allocation(vk_to_raw(image));
    }

    fn free_dummy_allocation(&mut self, raw: u64) {
        let Some(allocation) = self.dummy_allocations.remove(&raw) else {
            return;
        };
        match self.allocator.lock() {
            Ok(mut allocator) => {
                if let Err(e) = allocator.free(allocation) {
                    engine_warn!("galaxy3d::vulkan", "Failed to free dummy resource memory: {}", e);
                }
            }
            Err(_) => {
                engine_warn!("galaxy3d::vulkan", "Allocator mutex poisoned, leaking dummy resource memory");
            }
        }
    }
}

impl Device for VulkanDevice {
    fn create_graphics_pipeline(&mut self, desc: &GraphicsPipelineDesc) -> Result<PipelineHandle> {
        // Shader stages
        let shader_stages: Vec<vk::PipelineShaderStageCreateInfo> = desc.stages
            .iter()
            .map(|stage| {
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(shader_stage_to_vk(stage.stage))
                    .module(raw_to_vk(stage.module.as_raw()))
                    .name(SHADER_ENTRY_POINT)
            })
            .collect();

        // Vertex input state
        let (vertex_bindings, vertex_attributes) =
            vertex_input_to_vk(&desc.vertex_attributes, &desc.vertex_bindings)?;

        let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&vertex_bindings)
            .vertex_attribute_descriptions(&vertex_attributes);

        // Input assembly state
        let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(topology_to_vk(desc.topology))
            .primitive_restart_enable(false);

        // Viewport state (dynamic)
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);

        // Rasterization state
        let rasterization_state = {
            let mut info = vk::PipelineRasterizationStateCreateInfo::default()
                .depth_clamp_enable(false)
                .rasterizer_discard_enable(false)
                .polygon_mode(vk::PolygonMode::FILL)
                .line_width(1.0)
                .cull_mode(cull_mode_to_vk(desc.rasterization.cull_mode))
                .front_face(front_face_to_vk(desc.rasterization.front_face));
            if let Some(bias) = desc.rasterization.depth_bias {
                info = info
                    .depth_bias_enable(true)
                    .depth_bias_constant_factor(bias.constant_factor)
                    .depth_bias_slope_factor(bias.slope_factor)
                    .depth_bias_clamp(0.0);
            } else {
                info = info.depth_bias_enable(false);
            }
            info
        };

        // Depth state (stencil stays disabled)
        let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(desc.depth_stencil.depth_test_enable)
            .depth_write_enable(desc.depth_stencil.depth_write_enable)
            .depth_compare_op(compare_op_to_vk(desc.depth_stencil.depth_compare_op))
            .depth_bounds_test_enable(false)
            .stencil_test_enable(false);

        // Multisample state
        let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
            .sample_shading_enable(false)
            .rasterization_samples(sample_count_to_vk(desc.multisample.sample_count))
            .alpha_to_coverage_enable(desc.multisample.alpha_to_coverage);

        // Color blend state, one attachment per color target
        let color_blend_attachments: Vec<vk::PipelineColorBlendAttachmentState> = desc.color_blend_attachments
            .iter()
            .map(|blend| {
                let mut attachment = vk::PipelineColorBlendAttachmentState::default()
                    .color_write_mask(color_write_mask_to_vk(blend.color_write_mask))
                    .blend_enable(blend.blend_enable);
                if blend.blend_enable {
                    attachment = attachment
                        .src_color_blend_factor(blend_factor_to_vk(blend.src_color_factor))
                        .dst_color_blend_factor(blend_factor_to_vk(blend.dst_color_factor))
                        .color_blend_op(blend_op_to_vk(blend.color_blend_op))
                        .src_alpha_blend_factor(blend_factor_to_vk(blend.src_alpha_factor))
                        .dst_alpha_blend_factor(blend_factor_to_vk(blend.dst_alpha_factor))
                        .alpha_blend_op(blend_op_to_vk(blend.alpha_blend_op));
                }
                attachment
            })
            .collect();

        let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .attachments(&color_blend_attachments);

        // Dynamic state
        let dynamic_states: Vec<vk::DynamicState> = desc.dynamic_states
            .iter()
            .map(|state| dynamic_state_to_vk(*state))
            .collect();
        let dynamic_state = vk::PipelineDynamicStateCreateInfo::default()
            .dynamic_states(&dynamic_states);

        let pipeline_create_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly_state)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization_state)
            .depth_stencil_state(&depth_stencil_state)
            .multisample_state(&multisample_state)
            .color_blend_state(&color_blend_state)
            .dynamic_state(&dynamic_state)
            .layout(raw_to_vk(desc.layout.as_raw()))
            .render_pass(raw_to_vk(desc.render_pass.as_raw()))
            .subpass(desc.subpass);

        let pipelines = unsafe {
            self.device.create_graphics_pipelines(
                vk::PipelineCache::null(),
                std::slice::from_ref(&pipeline_create_info),
                None,
            )
            .map_err(|(_, e)| vk_result_to_error("Failed to create graphics pipeline", e))?
        };

        let pipeline = pipelines.first().copied()
            .ok_or_else(|| engine_err!("galaxy3d::vulkan", "vkCreateGraphicsPipelines returned no pipeline"))?;

        Ok(PipelineHandle::from_raw(vk_to_raw(pipeline)))
    }

    fn create_descriptor_set_layout(
        &mut self,
        bindings: &[DescriptorSetLayoutBinding],
    ) -> Result<DescriptorSetLayoutHandle> {
        let vk_bindings: Vec<vk::DescriptorSetLayoutBinding> = bindings
            .iter()
            .map(|entry| {
                vk::DescriptorSetLayoutBinding::default()
                    .binding(entry.binding)
                    .descriptor_type(descriptor_type_to_vk(entry.descriptor_type))
                    .descriptor_count(entry.count)
                    .stage_flags(stage_flags_to_vk(entry.stage_flags))
            })
            .collect();

        let layout_create_info = vk::DescriptorSetLayoutCreateInfo::default()
            .bindings(&vk_bindings);

        let layout = unsafe {
            self.device.create_descriptor_set_layout(&layout_create_info, None)
                .map_err(|e| vk_result_to_error("Failed to create descriptor set layout", e))?
        };

        Ok(DescriptorSetLayoutHandle::from_raw(vk_to_raw(layout)))
    }

    fn create_pipeline_layout(&mut self, set_layouts: &DescriptorSetLayouts) -> Result<PipelineLayoutHandle> {
        let vk_set_layouts: Vec<vk::DescriptorSetLayout> = set_layouts
            .iter()
            .map(|layout| raw_to_vk(layout.as_raw()))
            .collect();

        let layout_create_info = vk::PipelineLayoutCreateInfo::default()
            .set_layouts(&vk_set_layouts);

        let layout = unsafe {
            self.device.create_pipeline_layout(&layout_create_info, None)
                .map_err(|e| vk_result_to_error("Failed to create pipeline layout", e))?
        };

        Ok(PipelineLayoutHandle::from_raw(vk_to_raw(layout)))
    }

    fn create_descriptor_pool(&mut self, desc: &DescriptorPoolDesc) -> Result<DescriptorPoolHandle> {
        let pool_sizes: Vec<vk::DescriptorPoolSize> = [
            (vk::DescriptorType::UNIFORM_BUFFER, desc.uniform_buffer_count),
            (vk::DescriptorType::COMBINED_IMAGE_SAMPLER, desc.combined_image_sampler_count),
            (vk::DescriptorType::INPUT_ATTACHMENT, desc.input_attachment_count),
        ]
        .into_iter()
        .filter(|&(_, descriptor_count)| descriptor_count > 0)
        .map(|(ty, descriptor_count)| vk::DescriptorPoolSize { ty, descriptor_count })
        .collect();

        let flags = if desc.free_individual_sets {
            vk::DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET
        } else {
            vk::DescriptorPoolCreateFlags::empty()
        };

        let info = vk::DescriptorPoolCreateInfo::default()
            .flags(flags)
            .pool_sizes(&pool_sizes)
            .max_sets(desc.max_sets);

        let pool = unsafe {
            self.device.create_descriptor_pool(&info, None)
                .map_err(|e| vk_result_to_error("Failed to create descriptor pool", e))?
        };

        engine_debug!("galaxy3d::vulkan", "Created descriptor pool (max_sets: {})", desc.max_sets);
        Ok(DescriptorPoolHandle::from_raw(vk_to_raw(pool)))
    }

    fn allocate_descriptor_sets(
        &mut self,
        pool: DescriptorPoolHandle,
        set_layouts: &DescriptorSetLayouts,
    ) -> Result<DescriptorBundle> {
        let vk_set_layouts: Vec<vk::DescriptorSetLayout> = set_layouts
            .iter()
            .map(|layout| raw_to_vk(layout.as_raw()))
            .collect();

        let alloc_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(raw_to_vk(pool.as_raw()))
            .set_layouts(&vk_set_layouts);

        let sets = unsafe {
            self.device.allocate_descriptor_sets(&alloc_info)
                .map_err(|e| vk_result_to_error("Failed to allocate descriptor sets", e))?
        };

        let mut bundle: DescriptorBundle = Default::default();
        if sets.len() != bundle.len() {
            return Err(Error::InvalidResource(format!(
                "vkAllocateDescriptorSets returned {} sets, expected {}",
                sets.len(),
                bundle.len()
            )));
        }
        for (slot, set) in bundle.iter_mut().zip(sets) {
            *slot = DescriptorSetHandle::from_raw(vk_to_raw(set));
        }
        Ok(bundle)
    }

    fn free_descriptor_sets(&mut self, pool: DescriptorPoolHandle, sets: &[DescriptorSetHandle]) -> Result<()> {
        let vk_sets: Vec<vk::DescriptorSet> = sets
            .iter()
            .map(|set| raw_to_vk(set.as_raw()))
            .collect();

        unsafe {
            self.device.free_descriptor_sets(raw_to_vk(pool.as_raw()), &vk_sets)
                .map_err(|e| vk_result_to_error("Failed to free descriptor sets", e))
        }
    }

    fn update_descriptor_sets(&mut self, writes: &[DescriptorWrite]) {
        // Resolve every info first so the writes can borrow stable slices
        let mut buffer_infos: Vec<vk::DescriptorBufferInfo> = Vec::with_capacity(writes.len());
        let mut image_infos: Vec<vk::DescriptorImageInfo> = Vec::with_capacity(writes.len());
        for write in writes {
            match &write.resource {
                DescriptorResource::UniformBuffer(info) => {
                    buffer_infos.push(vk::DescriptorBufferInfo {
                        buffer: raw_to_vk(info.buffer.as_raw()),
                        offset: info.offset,
                        range: descriptor_range_to_vk(info.range),
                    });
                }
                DescriptorResource::CombinedImageSampler(info) | DescriptorResource::InputAttachment(info) => {
                    image_infos.push(image_info_to_vk(info));
                }
            }
        }

        let mut next_buffer = 0;
        let mut next_image = 0;
        let vk_writes: Vec<vk::WriteDescriptorSet> = writes
            .iter()
            .map(|write| {
                let vk_write = vk::WriteDescriptorSet::default()
                    .dst_set(raw_to_vk(write.dst_set.as_raw()))
                    .dst_binding(write.dst_binding)
                    .dst_array_element(0)
                    .descriptor_type(descriptor_type_to_vk(write.resource.descriptor_type()));
                match write.resource {
                    DescriptorResource::UniformBuffer(_) => {
                        next_buffer += 1;
                        vk_write.buffer_info(std::slice::from_ref(&buffer_infos[next_buffer - 1]))
                    }
                    DescriptorResource::CombinedImageSampler(_) | DescriptorResource::InputAttachment(_) => {
                        next_image += 1;
                        vk_write.image_info(std::slice::from_ref(&image_infos[next_image - 1]))
                    }
                }
            })
            .collect();

        unsafe {
            self.device.update_descriptor_sets(&vk_writes, &[]);
        }
    }

    fn create_dummy_resources(&mut self) -> Result<DummyResources> {
        let mut dummy = DummyResources {
            buffer_size: DUMMY_BUFFER_SIZE,
            ..Default::default()
        };

        if let Err(e) = self.fill_dummy_resources(&mut dummy) {
            self.destroy_dummy_resources(dummy);
            return Err(e);
        }

        engine_debug!("galaxy3d::vulkan", "Created dummy resources ({}-byte buffer, 1x1 image)", DUMMY_BUFFER_SIZE);
        Ok(dummy)
    }

    fn destroy_dummy_resources(&mut self, dummy: DummyResources) {
        unsafe {
            if !dummy.sampler.is_null() {
                self.device.destroy_sampler(raw_to_vk(dummy.sampler.as_raw()), None);
            }
            if !dummy.image_view.is_null() {
                self.device.destroy_image_view(raw_to_vk(dummy.image_view.as_raw()), None);
            }
        }
        if !dummy.image.is_null() {
            self.release_dummy_image(raw_to_vk(dummy.image.as_raw()));
        }
        if !dummy.buffer.is_null() {
            self.release_dummy_buffer(raw_to_vk(dummy.buffer.as_raw()));
        }
    }

    fn destroy(&mut self, object: GpuObject) {
        unsafe {
            match object {
                GpuObject::Pipeline(h) => {
                    self.device.destroy_pipeline(raw_to_vk(h.as_raw()), None);
                }
                GpuObject::PipelineLayout(h) => {
                    self.device.destroy_pipeline_layout(raw_to_vk(h.as_raw()), None);
                }
                GpuObject::DescriptorSetLayout(h) => {
                    self.device.destroy_descriptor_set_layout(raw_to_vk(h.as_raw()), None);
                }
                GpuObject::DescriptorPool(h) => {
                    self.device.destroy_descriptor_pool(raw_to_vk(h.as_raw()), None);
                }
            }
        }
    }

    fn wait_idle(&mut self) -> Result<()> {
        unsafe {
            self.device
                .device_wait_idle()
                .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to wait idle: {:?}", e))
        }
    }

    fn cmd_bind_pipeline(&mut self, cmd: CommandBufferHandle, pipeline: PipelineHandle) {
        unsafe {
            self.device.cmd_bind_pipeline(
                raw_to_vk(cmd.as_raw()),
                vk::PipelineBindPoint::GRAPHICS,
                raw_to_vk(pipeline.as_raw()),
            );
        }
    }

    fn cmd_bind_descriptor_sets(
        &mut self,
        cmd: CommandBufferHandle,
        layout: PipelineLayoutHandle,
        sets: &DescriptorBundle,
    ) {
        let vk_sets: [vk::DescriptorSet; DESCRIPTOR_TYPE_COUNT] = sets.map(|set| raw_to_vk(set.as_raw()));

        unsafe {
            self.device.cmd_bind_descriptor_sets(
                raw_to_vk(cmd.as_raw()),
                vk::PipelineBindPoint::GRAPHICS,
                raw_to_vk(layout.as_raw()),
                0,
                &vk_sets,
                &[],
            );
        }
    }

    fn cmd_set_scissor(&mut self, cmd: CommandBufferHandle, scissor: Rect2D) {
        let rect = vk::Rect2D {
            offset: vk::Offset2D { x: scissor.x, y: scissor.y },
            extent: vk::Extent2D { width: scissor.width, height: scissor.height },
        };

        unsafe {
            self.device.cmd_set_scissor(raw_to_vk(cmd.as_raw()), 0, std::slice::from_ref(&rect));
        }
    }
}

impl Drop for VulkanDevice {
    fn drop(&mut self) {
        if !self.dummy_allocations.is_empty() {
            engine_warn!(
                "galaxy3d::vulkan",
                "VulkanDevice dropped with {} dummy allocations still live",
                self.dummy_allocations.len()
            );
            let raws: Vec<u64> = self.dummy_allocations.keys().copied().collect();
            for raw in raws {
                self.free_dummy_allocation(raw);
            }
        }
    }
}
